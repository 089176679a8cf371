mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::traits::ChatTransport;

use client::OpenRouterClient;
use types::ChatRequest;

pub const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1";

// =============================================================================
// OpenRouter Agent
// =============================================================================

#[derive(Clone)]
pub struct OpenRouter {
    model: String,
    client: OpenRouterClient,
}

impl OpenRouter {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            client: OpenRouterClient::new(api_key, OPENROUTER_API_URL),
        }
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.client = self.client.with_app_name(name);
        self
    }

    pub fn with_site_url(mut self, url: impl Into<String>) -> Self {
        self.client = self.client.with_site_url(url);
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(url);
        self
    }

    /// Per-request timeout. Without one a request may wait indefinitely.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = self.client.with_timeout(timeout);
        self
    }
}

// =============================================================================
// ChatTransport Implementation
// =============================================================================

#[async_trait]
impl ChatTransport for OpenRouter {
    fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, request: &ChatRequest) -> Result<serde_json::Value> {
        self.client.chat(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AiError;

    #[test]
    fn test_openrouter_new() {
        let or = OpenRouter::new("or-test", "nvidia/nemotron-nano-12b-v2-vl:free");
        assert_eq!(or.model(), "nvidia/nemotron-nano-12b-v2-vl:free");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_network_error() {
        let or = OpenRouter::new("or-test", "m")
            .with_base_url("http://127.0.0.1:1")
            .with_timeout(Duration::from_secs(5));
        let err = or.send(&ChatRequest::new("m")).await.unwrap_err();
        assert!(matches!(err, AiError::Network(_)));
    }
}
