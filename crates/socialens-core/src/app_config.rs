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

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub openai_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_primary_timeout_secs: u64,
    pub scraper_secondary_timeout_secs: u64,
    pub scraper_max_urls: usize,
    pub analysis_delay_ms: u64,
    pub analysis_history_capacity: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field(
                "scraper_primary_timeout_secs",
                &self.scraper_primary_timeout_secs,
            )
            .field(
                "scraper_secondary_timeout_secs",
                &self.scraper_secondary_timeout_secs,
            )
            .field("scraper_max_urls", &self.scraper_max_urls)
            .field("analysis_delay_ms", &self.analysis_delay_ms)
            .field(
                "analysis_history_capacity",
                &self.analysis_history_capacity,
            )
            .finish()
    }
}
