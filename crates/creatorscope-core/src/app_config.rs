use std::net::SocketAddr;

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
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Bearer credential for the upstream search backends. Requests fail with
    /// a configuration error while this is unset.
    pub upstream_token: Option<String>,
    pub upstream_base_url: String,
    pub upstream_page_size: u32,
    pub user_agent: String,
    pub youtube_relaxed_fallback: bool,
    pub rate_limit_per_minute: usize,
    pub api_url: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "upstream_token",
                &self.upstream_token.as_ref().map(|_| "[redacted]"),
            )
            .field("upstream_base_url", &self.upstream_base_url)
            .field("upstream_page_size", &self.upstream_page_size)
            .field("user_agent", &self.user_agent)
            .field("youtube_relaxed_fallback", &self.youtube_relaxed_fallback)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("api_url", &self.api_url)
            .finish()
    }
}
