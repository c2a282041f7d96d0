use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// How the directory matches a location against a service's coverage.
///
/// `PostalCode` is used whenever a zip is known; `Within` and `Serving` apply
/// to the region-level fallback search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationMode {
    PostalCode,
    Within,
    Serving,
}

impl LocationMode {
    /// Wire value sent as the `locationMode` query parameter.
    #[must_use]
    pub fn as_param(self) -> &'static str {
        match self {
            LocationMode::PostalCode => "PostalCode",
            LocationMode::Within => "Within",
            LocationMode::Serving => "Serving",
        }
    }
}

impl std::fmt::Display for LocationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationMode::PostalCode => write!(f, "postal_code"),
            LocationMode::Within => write!(f, "within"),
            LocationMode::Serving => write!(f, "serving"),
        }
    }
}

impl FromStr for LocationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postal_code" | "postalcode" => Ok(LocationMode::PostalCode),
            "within" => Ok(LocationMode::Within),
            "serving" => Ok(LocationMode::Serving),
            other => Err(format!(
                "unknown location mode '{other}'; expected within, serving, or postal_code"
            )),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub directory_url: Option<String>,
    pub directory_api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub page_size: u32,
    pub max_distance_miles: u32,
    pub fallback_region: String,
    pub fallback_location_mode: LocationMode,
    pub geolocation_timeout_secs: u64,
    pub state_path: PathBuf,
    pub taxonomy_path: Option<PathBuf>,
}

impl AppConfig {
    /// Returns the directory endpoint, which only search commands need.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::MissingEnvVar`] when
    /// `FINDHELP_DIRECTORY_URL` was not set.
    pub fn require_directory_url(&self) -> Result<&str, crate::ConfigError> {
        self.directory_url
            .as_deref()
            .ok_or_else(|| crate::ConfigError::MissingEnvVar("FINDHELP_DIRECTORY_URL".to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("directory_url", &self.directory_url)
            .field(
                "directory_api_key",
                &self.directory_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("page_size", &self.page_size)
            .field("max_distance_miles", &self.max_distance_miles)
            .field("fallback_region", &self.fallback_region)
            .field("fallback_location_mode", &self.fallback_location_mode)
            .field("geolocation_timeout_secs", &self.geolocation_timeout_secs)
            .field("state_path", &self.state_path)
            .field("taxonomy_path", &self.taxonomy_path)
            .finish()
    }
}
