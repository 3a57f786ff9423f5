use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

/// Which backend holds user profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileBackend {
    Postgres,
    Document,
    Memory,
}

impl ProfileBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileBackend::Postgres => "postgres",
            ProfileBackend::Document => "document",
            ProfileBackend::Memory => "memory",
        }
    }
}

impl FromStr for ProfileBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(ProfileBackend::Postgres),
            "document" | "docs" => Ok(ProfileBackend::Document),
            "memory" => Ok(ProfileBackend::Memory),
            other => Err(anyhow!(
                "PROFILE_STORE must be one of postgres, document, memory (got '{other}')"
            )),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if a variable required by the selected backend is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub profile_backend: ProfileBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub document_store_url: Option<String>,
    pub document_store_api_key: Option<String>,
    /// Unset means the profile fetch never times out.
    pub profile_fetch_timeout: Option<Duration>,
    pub reference_data_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let profile_backend = optional_env("PROFILE_STORE")
            .map(|v| v.parse::<ProfileBackend>())
            .transpose()?
            .unwrap_or(ProfileBackend::Memory);

        let (database_url, document_store_url, document_store_api_key) = match profile_backend {
            ProfileBackend::Postgres => (Some(require_env("DATABASE_URL")?), None, None),
            ProfileBackend::Document => (
                None,
                Some(require_env("DOCUMENT_STORE_URL")?),
                Some(require_env("DOCUMENT_STORE_API_KEY")?),
            ),
            ProfileBackend::Memory => (None, None, None),
        };

        let profile_fetch_timeout = optional_env("PROFILE_FETCH_TIMEOUT_SECS")
            .map(|v| {
                v.parse::<u64>()
                    .context("PROFILE_FETCH_TIMEOUT_SECS must be a whole number of seconds")
            })
            .transpose()?
            .map(Duration::from_secs);

        Ok(Config {
            profile_backend,
            database_url,
            database_max_connections: optional_env("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|| "10".to_string())
                .parse::<u32>()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            document_store_url,
            document_store_api_key,
            profile_fetch_timeout,
            reference_data_dir: optional_env("REFERENCE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            port: optional_env("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parse_accepts_aliases() {
        assert_eq!("Postgres".parse::<ProfileBackend>().unwrap(), ProfileBackend::Postgres);
        assert_eq!("pg".parse::<ProfileBackend>().unwrap(), ProfileBackend::Postgres);
        assert_eq!(" document ".parse::<ProfileBackend>().unwrap(), ProfileBackend::Document);
        assert_eq!("memory".parse::<ProfileBackend>().unwrap(), ProfileBackend::Memory);
    }

    #[test]
    fn test_backend_parse_rejects_unknown() {
        let err = "sheets".parse::<ProfileBackend>().unwrap_err();
        assert!(err.to_string().contains("sheets"));
    }
}
