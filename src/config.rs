use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::domain::Decimal;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub sync_secret: Secret,
    pub ledger_collection: String,
    pub sheet_backend: SheetBackend,
    pub sheet_read_range: String,
    pub sheet_append_range: String,
    pub fallback_cost_factor: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetBackend {
    Csv {
        path: String,
    },
    Google {
        api_url: String,
        spreadsheet_id: String,
        access_token: Secret,
    },
}

/// A credential that never shows up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: String) -> Self {
        Secret(value)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Compare against a presented value by SHA-256 digest, so the comparison
    /// time does not depend on how many leading bytes match.
    pub fn matches(&self, presented: &str) -> bool {
        let expected = Sha256::digest(self.0.as_bytes());
        let actual = Sha256::digest(presented.as_bytes());
        expected
            .iter()
            .zip(actual.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = required(&env_map, "DATABASE_PATH")?;

        let sync_secret = required(&env_map, "SYNC_SECRET_KEY")?;
        if sync_secret.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "SYNC_SECRET_KEY".to_string(),
                "must not be blank".to_string(),
            ));
        }

        let ledger_collection = env_map
            .get("LEDGER_COLLECTION")
            .cloned()
            .unwrap_or_else(|| "transactions".to_string());

        let sheet_backend = match env_map
            .get("SHEET_BACKEND")
            .map(|s| s.as_str())
            .unwrap_or("csv")
        {
            "csv" => SheetBackend::Csv {
                path: required(&env_map, "SHEET_CSV_PATH")?,
            },
            "google" => SheetBackend::Google {
                api_url: env_map
                    .get("GOOGLE_SHEETS_API_URL")
                    .cloned()
                    .unwrap_or_else(|| "https://sheets.googleapis.com".to_string()),
                spreadsheet_id: required(&env_map, "GOOGLE_SHEET_ID")?,
                access_token: Secret::new(required(&env_map, "GOOGLE_SHEETS_ACCESS_TOKEN")?),
            },
            other => {
                return Err(ConfigError::InvalidValue(
                    "SHEET_BACKEND".to_string(),
                    format!("must be csv or google, got {}", other),
                ))
            }
        };

        let sheet_read_range = env_map
            .get("SHEET_READ_RANGE")
            .cloned()
            .unwrap_or_else(|| "Sheet1!A:AC".to_string());
        let sheet_append_range = env_map
            .get("SHEET_APPEND_RANGE")
            .cloned()
            .unwrap_or_else(|| "Sheet1!A2".to_string());

        let fallback_cost_factor = env_map
            .get("FALLBACK_COST_FACTOR")
            .map(|s| s.as_str())
            .unwrap_or("0.98")
            .parse::<Decimal>()
            .ok()
            .filter(|d| !d.is_negative())
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "FALLBACK_COST_FACTOR".to_string(),
                    "must be a non-negative decimal".to_string(),
                )
            })?;

        Ok(Config {
            port,
            database_path,
            sync_secret: Secret::new(sync_secret),
            ledger_collection,
            sheet_backend,
            sheet_read_range,
            sheet_append_range,
            fallback_cost_factor,
        })
    }
}

fn required(env_map: &HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    env_map
        .get(key)
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnv(key.to_string()))
}
