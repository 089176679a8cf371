use async_trait::async_trait;

use crate::error::Result;
use crate::openrouter::types::ChatRequest;

// =============================================================================
// ChatTransport Trait
// =============================================================================

/// Sends a chat-completion request and hands back the decoded JSON body.
///
/// The body is returned untyped so callers decide what a usable response
/// looks like. Production uses [`crate::OpenRouter`]; tests swap in a double.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Model identifier placed in outgoing requests.
    fn model(&self) -> &str;

    async fn send(&self, request: &ChatRequest) -> Result<serde_json::Value>;
}
