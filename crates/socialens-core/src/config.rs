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
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("SOCIALENS_ENV", "development"))?;
    let log_level = or_default("SOCIALENS_LOG_LEVEL", "info");

    let openai_api_key = lookup("OPENAI_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());
    let llm_base_url = or_default("SOCIALENS_LLM_BASE_URL", "https://api.openai.com/v1")
        .trim_end_matches('/')
        .to_string();
    let llm_model = or_default("SOCIALENS_LLM_MODEL", "gpt-4o-mini");
    let llm_timeout_secs = parse_u64("SOCIALENS_LLM_TIMEOUT_SECS", "60")?;

    let scraper_user_agent = or_default(
        "SOCIALENS_SCRAPER_USER_AGENT",
        "socialens/0.1 (profile-analysis)",
    );
    let scraper_primary_timeout_secs = parse_u64("SOCIALENS_SCRAPER_PRIMARY_TIMEOUT_SECS", "10")?;
    let scraper_secondary_timeout_secs =
        parse_u64("SOCIALENS_SCRAPER_SECONDARY_TIMEOUT_SECS", "15")?;
    let scraper_max_urls = parse_usize("SOCIALENS_SCRAPER_MAX_URLS", "3")?;
    if !(1..=3).contains(&scraper_max_urls) {
        return Err(ConfigError::InvalidEnvVar {
            var: "SOCIALENS_SCRAPER_MAX_URLS".to_string(),
            reason: "must be between 1 and 3".to_string(),
        });
    }

    let analysis_delay_ms = parse_u64("SOCIALENS_ANALYSIS_DELAY_MS", "2000")?;
    let analysis_history_capacity = parse_usize("SOCIALENS_ANALYSIS_HISTORY_CAPACITY", "50")?;

    Ok(AppConfig {
        env,
        log_level,
        openai_api_key,
        llm_base_url,
        llm_model,
        llm_timeout_secs,
        scraper_user_agent,
        scraper_primary_timeout_secs,
        scraper_secondary_timeout_secs,
        scraper_max_urls,
        analysis_delay_ms,
        analysis_history_capacity,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SOCIALENS_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
