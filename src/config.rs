use crate::error::ConfigError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_EXPORT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Token(String),
    Login { email: String, password: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub credentials: Option<Credentials>,
    pub export_timeout: Duration,
    pub export_dir: PathBuf,
    pub search: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.into(),
            credentials: None,
            export_timeout: DEFAULT_EXPORT_TIMEOUT,
            export_dir: PathBuf::from("."),
            search: String::new(),
        }
    }
}

impl Config {
    /// Reads `LUCT_*` variables from the process environment.
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = var("LUCT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        reqwest::Url::parse(&api_url).map_err(|e| ConfigError::BadUrl {
            name: "LUCT_API_URL",
            reason: e.to_string(),
        })?;

        let credentials = match (var("LUCT_API_TOKEN"), var("LUCT_EMAIL"), var("LUCT_PASSWORD")) {
            (Some(token), _, _) => Some(Credentials::Token(token)),
            (None, Some(email), Some(password)) => Some(Credentials::Login { email, password }),
            _ => None,
        };

        let export_timeout = match var("LUCT_EXPORT_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::BadNumber {
                    name: "LUCT_EXPORT_TIMEOUT_SECS",
                    value: raw,
                })?,
            None => DEFAULT_EXPORT_TIMEOUT,
        };

        Ok(Config {
            api_url: api_url.trim_end_matches('/').to_string(),
            credentials,
            export_timeout,
            export_dir: var("LUCT_EXPORT_DIR").map(PathBuf::from).unwrap_or_else(|| ".".into()),
            search: lookup("LUCT_SEARCH").unwrap_or_default(),
        })
    }

    pub fn require_credentials(&self) -> Result<&Credentials, ConfigError> {
        self.credentials.as_ref().ok_or(ConfigError::MissingCredentials)
    }
}
