use std::sync::Arc;

use ai_client::{truncate_to_char_boundary, ChatRequest, ChatTransport};
use async_trait::async_trait;
use tracing::{error, info};

use crate::encoder::EncodedFile;
use crate::error::{DigestError, Result};
use crate::payload::ChatPayloadBuilder;
use crate::pipeline::SummarizeStage;
use crate::result::{SummaryReport, SummaryResult};

/// How much of an unusable provider body goes into the log.
const LOGGED_BODY_LIMIT: usize = 2000;

/// Sends prepared files to the LLM and turns whatever comes back into a
/// [`SummaryResult`]. Every failure becomes `SummaryResult::Failure`.
pub struct SummaryClient {
    transport: Arc<dyn ChatTransport>,
    builder: ChatPayloadBuilder,
}

impl SummaryClient {
    pub fn new(transport: Arc<dyn ChatTransport>, builder: ChatPayloadBuilder) -> Self {
        Self { transport, builder }
    }

    pub fn model(&self) -> &str {
        self.transport.model()
    }

    pub async fn request_summary(&self, files: &[EncodedFile]) -> SummaryResult {
        if files.is_empty() {
            return SummaryResult::failure("No files to process");
        }

        let request = self.builder.request(self.model(), files);

        info!(
            files = files.len(),
            model = self.model(),
            pdf_parser = request.plugins.is_some(),
            "Sending files to OpenRouter"
        );

        match self.complete(&request).await {
            Ok((summary, raw)) => {
                info!(chars = summary.chars().count(), "Summary received");
                SummaryResult::Success(SummaryReport::new(summary, self.model(), files, Some(raw)))
            }
            Err(e) => {
                error!(error = %e, "Summary request failed");
                SummaryResult::failure(e.to_string())
            }
        }
    }

    async fn complete(&self, request: &ChatRequest) -> Result<(String, serde_json::Value)> {
        let body = self
            .transport
            .send(request)
            .await
            .map_err(|e| DigestError::ProviderRequest(e.to_string()))?;

        let summary = extract_summary(&body)?;
        Ok((summary, body))
    }
}

#[async_trait]
impl SummarizeStage for SummaryClient {
    async fn request_summary(&self, files: &[EncodedFile]) -> SummaryResult {
        SummaryClient::request_summary(self, files).await
    }
}

/// Pull `choices[0].message.content` out of a provider body.
///
/// Only that path is inspected; the rest of the body may take any shape.
pub fn extract_summary(body: &serde_json::Value) -> Result<String> {
    let content = body
        .pointer("/choices/0/message/content")
        .and_then(serde_json::Value::as_str)
        .filter(|text| !text.trim().is_empty());

    if let Some(summary) = content {
        return Ok(summary.to_string());
    }

    let raw = body.to_string();
    error!(
        body = truncate_to_char_boundary(&raw, LOGGED_BODY_LIMIT),
        "Unexpected response format from OpenRouter"
    );

    let detail = match body.pointer("/error/message").and_then(|m| m.as_str()) {
        Some(message) => format!("provider returned an error: {message}"),
        None => "missing or empty choices[0].message.content".to_string(),
    };
    Err(DigestError::ProviderResponseShape(detail))
}

// ---------------------------------------------------------------------------
// MockTransport (for tests)
// ---------------------------------------------------------------------------

#[cfg(any(test, feature = "test-support"))]
pub use mock::MockTransport;

#[cfg(any(test, feature = "test-support"))]
mod mock {
    use std::sync::Mutex;

    use ai_client::{AiError, ChatRequest, ChatTransport};
    use async_trait::async_trait;

    enum Reply {
        Body(serde_json::Value),
        Error(String),
    }

    /// Replies with a canned body (or a network error) and records requests.
    pub struct MockTransport {
        model: String,
        reply: Reply,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl MockTransport {
        pub fn returning(body: serde_json::Value) -> Self {
            Self::with_reply(Reply::Body(body))
        }

        /// Reply `{"choices":[{"message":{"content": <summary>}}]}`.
        pub fn with_summary(summary: &str) -> Self {
            Self::returning(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": summary}}]
            }))
        }

        pub fn failing(message: impl Into<String>) -> Self {
            Self::with_reply(Reply::Error(message.into()))
        }

        fn with_reply(reply: Reply) -> Self {
            Self {
                model: "mock/model".to_string(),
                reply,
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatTransport for MockTransport {
        fn model(&self) -> &str {
            &self.model
        }

        async fn send(&self, request: &ChatRequest) -> ai_client::Result<serde_json::Value> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.reply {
                Reply::Body(body) => Ok(body.clone()),
                Reply::Error(message) => Err(AiError::Network(message.clone())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn encoded(name: &str) -> EncodedFile {
        EncodedFile {
            filepath: PathBuf::from(format!("downloaded_files/{name}")),
            filename: name.to_string(),
            mime_type: crate::mime::resolve(name).to_string(),
            encoded_data: "QUJD".to_string(),
        }
    }

    fn client(transport: &Arc<MockTransport>) -> SummaryClient {
        SummaryClient::new(transport.clone(), ChatPayloadBuilder::default())
    }

    #[tokio::test]
    async fn empty_input_fails_without_network_call() {
        let transport = Arc::new(MockTransport::with_summary("unused"));
        let result = client(&transport).request_summary(&[]).await;

        assert_eq!(result.error(), Some("No files to process"));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn successful_response_becomes_report() {
        let transport = Arc::new(MockTransport::with_summary("Summary text."));
        let files = vec![encoded("a.pdf"), encoded("b.jpg")];

        let result = client(&transport).request_summary(&files).await;

        let SummaryResult::Success(report) = result else {
            panic!("expected success");
        };
        assert_eq!(report.summary, "Summary text.");
        assert_eq!(report.model, "mock/model");
        assert_eq!(report.files_processed, 2);
        assert_eq!(report.file_names, vec!["a.pdf", "b.jpg"]);
        assert!(report.raw_response.is_some());
        assert!(report.stats.is_none());

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].messages.len(), 4);
        assert!(requests[0].plugins.is_some());
    }

    #[tokio::test]
    async fn missing_choices_is_a_shape_error() {
        let transport = Arc::new(MockTransport::returning(json!({"id": "gen-1"})));
        let result = client(&transport).request_summary(&[encoded("a.txt")]).await;

        let error = result.error().expect("expected failure");
        assert!(error.contains("Unexpected response shape"), "{error}");
        assert!(error.contains("choices"), "{error}");
    }

    #[tokio::test]
    async fn empty_choices_is_a_shape_error() {
        let transport = Arc::new(MockTransport::returning(json!({"choices": []})));
        let result = client(&transport).request_summary(&[encoded("a.txt")]).await;
        assert!(result.error().unwrap().contains("Unexpected response shape"));
    }

    #[tokio::test]
    async fn provider_error_body_is_surfaced() {
        let transport = Arc::new(MockTransport::returning(json!({
            "error": {"code": 402, "message": "Insufficient credits"}
        })));
        let result = client(&transport).request_summary(&[encoded("a.txt")]).await;
        assert!(result.error().unwrap().contains("Insufficient credits"));
    }

    #[tokio::test]
    async fn transport_failure_is_normalized() {
        let transport = Arc::new(MockTransport::failing("connection reset"));
        let result = client(&transport).request_summary(&[encoded("a.txt")]).await;

        let error = result.error().expect("expected failure");
        assert!(error.starts_with("LLM request failed"), "{error}");
        assert!(error.contains("connection reset"), "{error}");
    }

    #[test]
    fn unrelated_fields_do_not_affect_extraction() {
        let partial_usage = json!({
            "choices": [{"message": {"role": "assistant", "content": "Summary text."}}],
            "usage": {"prompt_tokens": 12}
        });
        assert_eq!(extract_summary(&partial_usage).unwrap(), "Summary text.");

        let unknown_role = json!({
            "id": "gen-42",
            "choices": [{"message": {"role": "model", "content": "Сводка"}, "finish_reason": null}]
        });
        assert_eq!(extract_summary(&unknown_role).unwrap(), "Сводка");
    }

    #[test]
    fn empty_content_is_a_shape_error() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": "  "}}]});
        let err = extract_summary(&body).unwrap_err();
        assert!(err.to_string().contains("missing or empty"), "{err}");
    }

    #[tokio::test]
    async fn partial_usage_still_yields_a_report() {
        let transport = Arc::new(MockTransport::returning(json!({
            "choices": [{"message": {"role": "assistant", "content": "Summary text."}}],
            "usage": {"prompt_tokens": 12}
        })));
        let result = client(&transport).request_summary(&[encoded("a.pdf")]).await;

        let SummaryResult::Success(report) = result else {
            panic!("expected success");
        };
        assert_eq!(report.summary, "Summary text.");
    }

    #[test]
    fn non_string_content_is_rejected() {
        let body = json!({"choices": [{"message": {"content": [{"type": "text"}]}}]});
        assert!(matches!(
            extract_summary(&body),
            Err(DigestError::ProviderResponseShape(_))
        ));
    }
}
