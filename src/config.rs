//! Startup configuration — credentials, region, model, endpoint.
//!
//! Everything the model client needs is read once, here, into an explicit
//! `AppConfig` that gets passed to constructors. Nothing downstream reads
//! the process environment.

use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

use crate::llm::prompts::MODEL;

pub const DEFAULT_REGION: &str = "us-east-1";

pub const ENV_BEARER_TOKEN: &str = "AWS_BEARER_TOKEN_BEDROCK";
pub const ENV_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const ENV_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_MODEL_ID: &str = "SCREEN_ASSIST_MODEL_ID";
pub const ENV_ENDPOINT: &str = "SCREEN_ASSIST_ENDPOINT";

static REGION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}(-[a-z]+)+-\d{1,2}$").unwrap());

/// Long-lived AWS key material for the signed-request strategy.
#[derive(Clone)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

// Keep secrets out of logs.
impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("session_token", &self.session_token.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub region: String,
    pub bearer_token: Option<String>,
    pub static_credentials: Option<StaticCredentials>,
    pub model_id: String,
    /// Base URL override, e.g. a VPC endpoint or a local test server.
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("region", &self.region)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "***"))
            .field("static_credentials", &self.static_credentials)
            .field("model_id", &self.model_id)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl AppConfig {
    /// Load `.env` files, then read configuration from the process environment.
    ///
    /// `~/.config/screen-assist/.env` is read first, then `./.env`.
    /// Neither overrides variables already set in the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Some(path) = user_env_file() {
            if path.exists() {
                match dotenvy::from_path(&path) {
                    Ok(()) => log::debug!("[CONFIG] Loaded {}", path.display()),
                    Err(e) => log::warn!("[CONFIG] Ignoring {}: {}", path.display(), e),
                }
            }
        }
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let region = get(ENV_REGION).unwrap_or_else(|| DEFAULT_REGION.to_string());
        validate_region(&region)?;

        let static_credentials = match (get(ENV_ACCESS_KEY_ID), get(ENV_SECRET_ACCESS_KEY)) {
            (Some(access_key_id), Some(secret_access_key)) => Some(StaticCredentials {
                access_key_id,
                secret_access_key,
                session_token: get(ENV_SESSION_TOKEN),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::IncompleteCredentials(ENV_SECRET_ACCESS_KEY)),
            (None, Some(_)) => return Err(ConfigError::IncompleteCredentials(ENV_ACCESS_KEY_ID)),
        };

        Ok(Self {
            region,
            bearer_token: get(ENV_BEARER_TOKEN),
            static_credentials,
            model_id: get(ENV_MODEL_ID).unwrap_or_else(|| MODEL.to_string()),
            endpoint: get(ENV_ENDPOINT),
        })
    }

    /// Apply a region override (from the command line).
    pub fn with_region(mut self, region: &str) -> Result<Self, ConfigError> {
        validate_region(region)?;
        self.region = region.to_string();
        Ok(self)
    }

    pub fn with_model_id(mut self, model_id: &str) -> Self {
        self.model_id = model_id.to_string();
        self
    }

    /// The Bedrock runtime base URL: the override, or the regional host.
    pub fn base_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://bedrock-runtime.{}.amazonaws.com", self.region),
        }
    }
}

fn validate_region(region: &str) -> Result<(), ConfigError> {
    if REGION_PATTERN.is_match(region) {
        Ok(())
    } else {
        Err(ConfigError::InvalidRegion(region.to_string()))
    }
}

fn user_env_file() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("screen-assist").join(".env"))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid AWS region code: '{0}'")]
    InvalidRegion(String),

    #[error("Incomplete AWS credentials: {0} is not set")]
    IncompleteCredentials(&'static str),

    #[error(
        "No credentials found: set {} or {} and {} (or run with --mock)",
        ENV_BEARER_TOKEN, ENV_ACCESS_KEY_ID, ENV_SECRET_ACCESS_KEY
    )]
    MissingCredentials,

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.model_id, MODEL);
        assert!(config.bearer_token.is_none());
        assert!(config.static_credentials.is_none());
        assert_eq!(config.base_url(), "https://bedrock-runtime.us-east-1.amazonaws.com");
    }

    #[test]
    fn empty_token_counts_as_unset() {
        let config = config_from(&[(ENV_BEARER_TOKEN, "   ")]).unwrap();
        assert!(config.bearer_token.is_none());
    }

    #[test]
    fn reads_static_credentials_with_session_token() {
        let config = config_from(&[
            (ENV_ACCESS_KEY_ID, "AKIDEXAMPLE"),
            (ENV_SECRET_ACCESS_KEY, "secret"),
            (ENV_SESSION_TOKEN, "session"),
            (ENV_REGION, "eu-central-1"),
        ])
        .unwrap();
        let creds = config.static_credentials.unwrap();
        assert_eq!(creds.access_key_id, "AKIDEXAMPLE");
        assert_eq!(creds.session_token.as_deref(), Some("session"));
        assert_eq!(config.region, "eu-central-1");
    }

    #[test]
    fn half_a_key_pair_is_an_error() {
        let result = config_from(&[(ENV_ACCESS_KEY_ID, "AKIDEXAMPLE")]);
        assert!(matches!(
            result,
            Err(ConfigError::IncompleteCredentials(ENV_SECRET_ACCESS_KEY))
        ));
    }

    #[test]
    fn rejects_malformed_region() {
        assert!(matches!(
            config_from(&[(ENV_REGION, "US East")]),
            Err(ConfigError::InvalidRegion(_))
        ));
        assert!(config_from(&[(ENV_REGION, "us-gov-west-1")]).is_ok());
        assert!(config_from(&[(ENV_REGION, "ap-southeast-2")]).is_ok());
    }

    #[test]
    fn endpoint_override_drops_trailing_slash() {
        let config = config_from(&[(ENV_ENDPOINT, "http://127.0.0.1:9000/")]).unwrap();
        assert_eq!(config.base_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = config_from(&[
            (ENV_BEARER_TOKEN, "bearer-secret"),
            (ENV_ACCESS_KEY_ID, "AKIDEXAMPLE"),
            (ENV_SECRET_ACCESS_KEY, "very-secret"),
        ])
        .unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("bearer-secret"));
        assert!(!printed.contains("very-secret"));
        assert!(printed.contains("AKIDEXAMPLE"));
    }
}
