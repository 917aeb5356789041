use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
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
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => parse_flag(&raw).ok_or_else(|| {
                invalid(var, format!("expected true/false/1/0, got '{raw}'"))
            }),
        }
    };

    let env = parse_environment(&or_default("CREATORSCOPE_ENV", "development"));
    let bind_addr = parse_addr("CREATORSCOPE_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("CREATORSCOPE_LOG_LEVEL", "info");

    let upstream_token = lookup("CREATORSCOPE_UPSTREAM_TOKEN")
        .ok()
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty());
    let upstream_base_url = or_default(
        "CREATORSCOPE_UPSTREAM_BASE_URL",
        "https://api.modash.io/v1",
    );
    let upstream_page_size = parse_u32("CREATORSCOPE_UPSTREAM_PAGE_SIZE", "15")?;
    if upstream_page_size == 0 {
        return Err(invalid(
            "CREATORSCOPE_UPSTREAM_PAGE_SIZE",
            "must be greater than zero".to_string(),
        ));
    }
    let user_agent = or_default(
        "CREATORSCOPE_USER_AGENT",
        "creatorscope/0.1 (influencer-search)",
    );
    let youtube_relaxed_fallback = parse_bool("CREATORSCOPE_YOUTUBE_RELAXED_FALLBACK", true)?;
    let rate_limit_per_minute = parse_usize("CREATORSCOPE_RATE_LIMIT_PER_MINUTE", "120")?;
    let api_url = or_default("CREATORSCOPE_API_URL", "http://127.0.0.1:3000");

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        upstream_token,
        upstream_base_url,
        upstream_page_size,
        user_agent,
        youtube_relaxed_fallback,
        rate_limit_per_minute,
        api_url,
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

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
