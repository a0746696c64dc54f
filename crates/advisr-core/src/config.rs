use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment};
use crate::geo::{LatLng, DEFAULT_CENTER};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a `HashMap`
/// lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        match raw.parse::<usize>() {
            Ok(0) => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be at least 1".to_string(),
            }),
            Ok(v) => Ok(v),
            Err(e) => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        }
    };

    let parse_coordinate = |var: &str, default: f64, limit: f64| -> Result<f64, ConfigError> {
        let Ok(raw) = lookup(var) else {
            return Ok(default);
        };
        let value = raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })?;
        if !value.is_finite() || value.abs() > limit {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("must be within -{limit}..={limit}"),
            });
        }
        Ok(value)
    };

    let places_api_key = require("ADVISR_PLACES_API_KEY")?;

    let env = parse_environment(&or_default("ADVISR_ENV", "development"))?;
    let log_level = or_default("ADVISR_LOG_LEVEL", "info");
    let api_base_url = or_default("ADVISR_API_BASE_URL", "http://localhost:8000/api");
    let places_base_url = or_default(
        "ADVISR_PLACES_BASE_URL",
        "https://maps.googleapis.com/maps/api/place",
    );
    let categories_path = lookup("ADVISR_CATEGORIES_PATH").ok().map(PathBuf::from);

    let request_timeout_secs = parse_u64("ADVISR_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("ADVISR_USER_AGENT", "advisr/0.1 (places-directory)");

    let default_center = LatLng::new(
        parse_coordinate("ADVISR_DEFAULT_LAT", DEFAULT_CENTER.lat, 90.0)?,
        parse_coordinate("ADVISR_DEFAULT_LNG", DEFAULT_CENTER.lng, 180.0)?,
    );
    let search_radius_m = parse_u32("ADVISR_SEARCH_RADIUS_M", "3000")?;

    let locate_guard_ms = parse_u64("ADVISR_LOCATE_GUARD_MS", "12000")?;
    let watch_timeout_ms = parse_u64("ADVISR_WATCH_TIMEOUT_MS", "5000")?;
    let category_timeout_ms = parse_u64("ADVISR_CATEGORY_TIMEOUT_MS", "12000")?;
    let category_delay_ms = parse_u64("ADVISR_CATEGORY_DELAY_MS", "300")?;
    let nearby_page_delay_ms = parse_u64("ADVISR_NEARBY_PAGE_DELAY_MS", "1500")?;
    let search_page_delay_ms = parse_u64("ADVISR_SEARCH_PAGE_DELAY_MS", "2000")?;
    let search_max_pages = parse_positive_usize("ADVISR_SEARCH_MAX_PAGES", "3")?;
    let detail_batch_size = parse_positive_usize("ADVISR_DETAIL_BATCH_SIZE", "5")?;
    let detail_batch_delay_ms = parse_u64("ADVISR_DETAIL_BATCH_DELAY_MS", "500")?;

    Ok(AppConfig {
        env,
        log_level,
        api_base_url,
        places_base_url,
        places_api_key,
        categories_path,
        request_timeout_secs,
        user_agent,
        default_center,
        search_radius_m,
        locate_guard_ms,
        watch_timeout_ms,
        category_timeout_ms,
        category_delay_ms,
        nearby_page_delay_ms,
        search_page_delay_ms,
        search_max_pages,
        detail_batch_size,
        detail_batch_delay_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ADVISR_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
