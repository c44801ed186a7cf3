use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "SOCIALENS_ENV"));
}

#[test]
fn build_app_config_succeeds_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.openai_api_key.is_none());
    assert_eq!(cfg.llm_base_url, "https://api.openai.com/v1");
    assert_eq!(cfg.llm_model, "gpt-4o-mini");
    assert_eq!(cfg.llm_timeout_secs, 60);
    assert_eq!(cfg.scraper_user_agent, "socialens/0.1 (profile-analysis)");
    assert_eq!(cfg.scraper_primary_timeout_secs, 10);
    assert_eq!(cfg.scraper_secondary_timeout_secs, 15);
    assert_eq!(cfg.scraper_max_urls, 3);
    assert_eq!(cfg.analysis_delay_ms, 2000);
    assert_eq!(cfg.analysis_history_capacity, 50);
}

#[test]
fn build_app_config_reads_api_key_and_trims_base_url() {
    let mut map = HashMap::new();
    map.insert("OPENAI_API_KEY", "sk-test");
    map.insert("SOCIALENS_LLM_BASE_URL", "http://localhost:8080/v1/");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.openai_api_key.as_deref(), Some("sk-test"));
    assert_eq!(cfg.llm_base_url, "http://localhost:8080/v1");
}

#[test]
fn build_app_config_treats_blank_api_key_as_absent() {
    let mut map = HashMap::new();
    map.insert("OPENAI_API_KEY", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.openai_api_key.is_none());
}

#[test]
fn build_app_config_rejects_invalid_timeout() {
    let mut map = HashMap::new();
    map.insert("SOCIALENS_SCRAPER_PRIMARY_TIMEOUT_SECS", "ten");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SOCIALENS_SCRAPER_PRIMARY_TIMEOUT_SECS"),
        "expected InvalidEnvVar(SOCIALENS_SCRAPER_PRIMARY_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_max_urls() {
    let mut map = HashMap::new();
    map.insert("SOCIALENS_SCRAPER_MAX_URLS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SOCIALENS_SCRAPER_MAX_URLS"),
        "expected InvalidEnvVar(SOCIALENS_SCRAPER_MAX_URLS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_max_urls_above_three() {
    let mut map = HashMap::new();
    map.insert("SOCIALENS_SCRAPER_MAX_URLS", "10");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SOCIALENS_SCRAPER_MAX_URLS"),
        "expected InvalidEnvVar(SOCIALENS_SCRAPER_MAX_URLS), got: {result:?}"
    );
}

#[test]
fn build_app_config_overrides_analysis_delay() {
    let mut map = HashMap::new();
    map.insert("SOCIALENS_ANALYSIS_DELAY_MS", "250");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.analysis_delay_ms, 250);
}

#[test]
fn debug_output_redacts_api_key() {
    let mut map = HashMap::new();
    map.insert("OPENAI_API_KEY", "sk-secret-value");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("sk-secret-value"));
    assert!(rendered.contains("[redacted]"));
}
