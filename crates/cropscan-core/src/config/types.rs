//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Gemini `generateContent` service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API base URL (without the `/models/...` suffix)
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key: "${GEMINI_API_KEY}".to_string(),
        }
    }
}

impl GeminiConfig {
    /// Full `generateContent` URL for the configured model, without the key.
    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

/// Retry settings for rate-limited or failed requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total send attempts, including the first
    pub max_attempts: u32,

    /// Base delay in milliseconds, doubled after every failed attempt
    pub base_delay_ms: u64,

    /// Upper bound (exclusive) of the random jitter added to each delay
    pub max_jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1000,
            max_jitter_ms: 1000,
        }
    }
}

/// Local fallback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Substitute a simulated assessment when the remote path fails.
    /// When false, failures resolve to an ERROR-graded result instead.
    pub enabled: bool,

    /// Artificial latency before a simulated result is returned
    pub latency_ms: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            latency_ms: 1200,
        }
    }
}

/// Resource limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Per-attempt HTTP timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Maximum image size in megabytes
    pub max_image_size_mb: u64,
}

impl LimitsConfig {
    pub fn max_image_bytes(&self) -> u64 {
        self.max_image_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 30_000,
            max_image_size_mb: 20,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
