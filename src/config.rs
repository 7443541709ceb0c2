//! Client configuration.

use std::time::Duration;

/// Configuration for the streaming client.
///
/// Built with the builder methods; `Default` targets a local development
/// backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, no trailing slash.
    pub base_url: String,
    /// Model sent with each request when the caller does not pick one.
    pub default_model: Option<String>,
    /// Ask the backend to stream its thinking trace.
    pub enable_thinking_chain: bool,
    /// Route the request through the LLM (as opposed to canned flows).
    pub use_llm: bool,
    /// A stream with no chunk for this long is failed as timed out.
    pub idle_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            default_model: None,
            enable_thinking_chain: true,
            use_llm: true,
            idle_timeout: Duration::from_secs(60),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    pub fn with_thinking_chain(mut self, enabled: bool) -> Self {
        self.enable_thinking_chain = enabled;
        self
    }

    pub fn with_use_llm(mut self, use_llm: bool) -> Self {
        self.use_llm = use_llm;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert!(config.default_model.is_none());
        assert!(config.enable_thinking_chain);
        assert!(config.use_llm);
        assert_eq!(config.idle_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_builder_chain() {
        let config = ClientConfig::new("https://api.example.com")
            .with_default_model("sonnet")
            .with_thinking_chain(false)
            .with_idle_timeout(Duration::from_secs(5));
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.default_model.as_deref(), Some("sonnet"));
        assert!(!config.enable_thinking_chain);
        assert_eq!(config.idle_timeout, Duration::from_secs(5));
    }
}
