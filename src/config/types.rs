use serde::Deserialize;

/// Main configuration structure for the scanner
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the API server listens on
    #[serde(rename = "bind-address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Default page budget for multi-page scans
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Default depth budget for multi-page scans
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Upper bound applied to page budgets requested by callers
    #[serde(rename = "max-pages-limit")]
    pub max_pages_limit: usize,

    /// Maximum number of new links enqueued per rendered page
    #[serde(rename = "link-fan-out")]
    pub link_fan_out: usize,

    /// Delay between consecutive page visits (milliseconds)
    #[serde(rename = "page-delay-ms")]
    pub page_delay_ms: u64,

    /// Hard bound on a single page render (milliseconds)
    #[serde(rename = "render-timeout-ms")]
    pub render_timeout_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 5,
            max_depth: 2,
            max_pages_limit: 50,
            link_fan_out: 10,
            page_delay_ms: 1000,
            render_timeout_ms: 15_000,
        }
    }
}

/// Page renderer configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// User agent sent with every page request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        }
    }
}

/// Language model configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model identifier, e.g. `gemini-2.5-flash`
    pub name: String,

    /// Base URL of the generative language API
    pub endpoint: String,

    /// Name of the environment variable holding the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    pub temperature: f32,

    #[serde(rename = "max-output-tokens")]
    pub max_output_tokens: u32,

    /// Delay between consecutive analysis calls (milliseconds)
    #[serde(rename = "analysis-delay-ms")]
    pub analysis_delay_ms: u64,

    /// Substrings that mark a model failure as quota/rate-limit exhaustion
    #[serde(rename = "quota-patterns")]
    pub quota_patterns: Vec<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            temperature: 0.3,
            max_output_tokens: 2048,
            analysis_delay_ms: 1000,
            quota_patterns: default_quota_patterns(),
        }
    }
}

/// Error text fragments providers use for quota and rate-limit failures
pub fn default_quota_patterns() -> Vec<String> {
    [
        "quota",
        "rate limit",
        "rate-limit",
        "resource_exhausted",
        "resource exhausted",
        "too many requests",
        "429",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl ModelConfig {
    /// Reads the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}
