use crate::app_config::{AppConfig, Environment, LocationMode};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("FINDHELP_ENV", "development"));
    let log_level = or_default("FINDHELP_LOG_LEVEL", "info");

    let directory_url = optional("FINDHELP_DIRECTORY_URL");
    let directory_api_key = optional("FINDHELP_DIRECTORY_API_KEY");

    let request_timeout_secs = parse_u64("FINDHELP_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("FINDHELP_USER_AGENT", "findhelp/0.1 (resource-directory)");

    let page_size = parse_u32("FINDHELP_PAGE_SIZE", "25")?;
    if page_size == 0 {
        return Err(invalid(
            "FINDHELP_PAGE_SIZE",
            "page size must be greater than zero".to_string(),
        ));
    }

    let max_distance_miles = parse_u32("FINDHELP_MAX_DISTANCE_MILES", "25")?;
    let fallback_region = or_default("FINDHELP_FALLBACK_REGION", "Santa Barbara County, CA");
    if fallback_region.trim().is_empty() {
        return Err(invalid(
            "FINDHELP_FALLBACK_REGION",
            "fallback region must be non-empty".to_string(),
        ));
    }

    let fallback_location_mode = or_default("FINDHELP_FALLBACK_LOCATION_MODE", "within")
        .parse::<LocationMode>()
        .map_err(|reason| invalid("FINDHELP_FALLBACK_LOCATION_MODE", reason))?;
    if fallback_location_mode == LocationMode::PostalCode {
        return Err(invalid(
            "FINDHELP_FALLBACK_LOCATION_MODE",
            "postal_code mode requires a zip and cannot be the fallback".to_string(),
        ));
    }

    let geolocation_timeout_secs = parse_u64("FINDHELP_GEOLOCATION_TIMEOUT_SECS", "10")?;
    let state_path = PathBuf::from(or_default("FINDHELP_STATE_PATH", "./.findhelp/state.json"));
    let taxonomy_path = optional("FINDHELP_TAXONOMY_PATH").map(PathBuf::from);

    Ok(AppConfig {
        env,
        log_level,
        directory_url,
        directory_api_key,
        request_timeout_secs,
        user_agent,
        page_size,
        max_distance_miles,
        fallback_region,
        fallback_location_mode,
        geolocation_timeout_secs,
        state_path,
        taxonomy_path,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
