//! Gemini remote analysis client.
//!
//! Sends the label + inline image through the `generateContent` API and asks
//! for a JSON-only quality verdict, then pulls the verdict back out of the
//! first text part of the first candidate.

use super::encode::EncodedImage;
use super::extract::parse_assessment;
use super::retry::RetryingTransport;
use super::transport::HttpRequest;
use crate::config::GeminiConfig;
use crate::error::{AnalysisError, PipelineResult};
use crate::types::{AnalysisResult, ProductLabel};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Build the instruction text that pins the schema and the product name.
pub fn build_prompt(label: &ProductLabel) -> String {
    format!(
        "Analyze the provided image of a {label}.\n\
         \n\
         Respond ONLY with valid JSON.\n\
         Set \"productName\" exactly to \"{label}\".\n\
         \n\
         Schema:\n\
         {{\n  \
           \"productName\": string,\n  \
           \"freshnessStatus\": string,\n  \
           \"overallQuality\": string,\n  \
           \"confidence\": number (0.5-1.0),\n  \
           \"justification\": string\n\
         }}\n"
    )
}

// --- Request types ---

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if non-blank.
    fn first_text(self) -> Option<String> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .next()?
            .text
            .filter(|t| !t.trim().is_empty())
    }
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    url: String,
    model: String,
    api_key: Option<String>,
    transport: RetryingTransport,
}

impl GeminiClient {
    /// Create a client with an explicit credential.
    ///
    /// A `None` key is accepted here; every `analyze` call then fails with
    /// `AnalysisError::Configuration` without touching the network.
    pub fn new(config: &GeminiConfig, api_key: Option<String>, transport: RetryingTransport) -> Self {
        Self {
            url: config.generate_url(),
            model: config.model.clone(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            transport,
        }
    }

    /// Create a client whose key is resolved from `config.api_key`.
    pub fn from_config(config: &GeminiConfig, transport: RetryingTransport) -> Self {
        Self::new(config, resolve_env_var(&config.api_key), transport)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Ask the remote model for a quality verdict on `image`.
    pub async fn analyze(
        &self,
        label: &ProductLabel,
        image: &EncodedImage,
    ) -> PipelineResult<AnalysisResult> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            AnalysisError::Configuration(
                "Gemini API key not set. Set GEMINI_API_KEY env var.".to_string(),
            )
        })?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::Text {
                        text: build_prompt(label),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type.clone(),
                            data: image.data.clone(),
                        },
                    },
                ],
            }],
        };
        let body = serde_json::to_value(&body).map_err(|e| {
            AnalysisError::MalformedResponse(format!("Failed to serialize request: {e}"))
        })?;

        let request = HttpRequest {
            url: self.url.clone(),
            query: vec![("key".to_string(), api_key.clone())],
            body,
        };

        let start = Instant::now();
        let resp = self.transport.send(&request).await?;
        tracing::debug!(
            "Gemini {} answered HTTP {} in {}ms",
            self.model,
            resp.status,
            start.elapsed().as_millis()
        );

        if !resp.is_success() {
            return Err(AnalysisError::Remote {
                status: resp.status,
                body: resp.body,
            });
        }

        let envelope: GenerateContentResponse = serde_json::from_str(&resp.body).map_err(|e| {
            AnalysisError::MalformedResponse(format!("Failed to parse Gemini response: {e}"))
        })?;
        let text = envelope.first_text().ok_or(AnalysisError::EmptyResponse)?;

        parse_assessment(&text, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::retry::BackoffPolicy;
    use crate::analysis::transport::{HttpResponse, Transport, TransportFault};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    /// Transport that records every request and replies from a factory.
    struct RecordingTransport {
        reply_fn: Box<dyn Fn(u32) -> Result<HttpResponse, TransportFault> + Send + Sync>,
        call_count: Arc<AtomicU32>,
        seen: Arc<Mutex<Vec<HttpRequest>>>,
    }

    impl RecordingTransport {
        fn replying(status: u16, body: &str) -> Self {
            let body = body.to_string();
            Self {
                reply_fn: Box::new(move |_| Ok(HttpResponse::new(status, body.clone()))),
                call_count: Arc::new(AtomicU32::new(0)),
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn post_json(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFault> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request.clone());
            (self.reply_fn)(idx)
        }
    }

    fn envelope(text: &str) -> String {
        serde_json::json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
        })
        .to_string()
    }

    fn client_with(
        transport: RecordingTransport,
        api_key: Option<&str>,
    ) -> (GeminiClient, Arc<AtomicU32>, Arc<Mutex<Vec<HttpRequest>>>) {
        let calls = transport.call_count.clone();
        let seen = transport.seen.clone();
        let policy = BackoffPolicy {
            max_attempts: 3,
            base_delay_ms: 10,
            max_jitter_ms: 0,
        };
        let client = GeminiClient::new(
            &GeminiConfig::default(),
            api_key.map(String::from),
            RetryingTransport::new(Arc::new(transport), policy),
        );
        (client, calls, seen)
    }

    fn wheat() -> ProductLabel {
        ProductLabel::new("wheat").unwrap()
    }

    fn image() -> EncodedImage {
        EncodedImage::from_bytes(&[0xFF, 0xD8, 0xFF], "image/jpeg")
    }

    #[test]
    fn test_prompt_pins_product_name() {
        let prompt = build_prompt(&wheat());
        assert!(prompt.contains("image of a wheat"));
        assert!(prompt.contains("Set \"productName\" exactly to \"wheat\""));
        assert!(prompt.contains("Respond ONLY with valid JSON"));
        assert!(prompt.contains("\"confidence\": number (0.5-1.0)"));
    }

    #[test]
    fn test_resolve_env_var() {
        // Non-env-var strings pass through
        assert_eq!(resolve_env_var("plain-key"), Some("plain-key".to_string()));
        // Empty returns None
        assert_eq!(resolve_env_var(""), None);
        // Unset env var returns None
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_XYZ_123}"), None);
    }

    #[tokio::test]
    async fn test_missing_credential_is_configuration_error() {
        let (client, calls, _) = client_with(RecordingTransport::replying(200, "{}"), None);
        assert!(!client.has_credential());

        let err = client.analyze(&wheat(), &image()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Configuration(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_credential_counts_as_missing() {
        let (client, _, _) = client_with(RecordingTransport::replying(200, "{}"), Some("  "));
        assert!(!client.has_credential());
    }

    #[tokio::test]
    async fn test_successful_analysis() {
        let text = "Sure! {\"productName\":\"wheat\",\"freshnessStatus\":\"Fresh\",\
                    \"overallQuality\":\"A\",\"confidence\":0.92,\"justification\":\"ok\"}";
        let (client, calls, _) =
            client_with(RecordingTransport::replying(200, &envelope(text)), Some("k"));

        let result = client.analyze(&wheat(), &image()).await.unwrap();
        assert_eq!(result.confidence, 92);
        assert_eq!(result.product_name, "wheat");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_request_wire_format() {
        let text = "{\"freshnessStatus\":\"Fresh\",\"overallQuality\":\"A\",\
                    \"confidence\":0.9,\"justification\":\"ok\"}";
        let (client, _, seen) = client_with(
            RecordingTransport::replying(200, &envelope(text)),
            Some("secret-key"),
        );
        client.analyze(&wheat(), &image()).await.unwrap();

        let seen = seen.lock().unwrap();
        let request = &seen[0];
        assert!(request
            .url
            .ends_with("/models/gemini-2.5-flash:generateContent"));
        assert_eq!(
            request.query,
            vec![("key".to_string(), "secret-key".to_string())]
        );

        let parts = &request.body["contents"][0]["parts"];
        assert_eq!(request.body["contents"][0]["role"], "user");
        assert!(parts[0]["text"].as_str().unwrap().contains("wheat"));
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inlineData"]["data"], "/9j/");
    }

    #[tokio::test]
    async fn test_non_success_status_is_remote_error() {
        let (client, calls, _) = client_with(
            RecordingTransport::replying(400, "API key not valid"),
            Some("k"),
        );
        let err = client.analyze(&wheat(), &image()).await.unwrap_err();
        match err {
            AnalysisError::Remote { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "API key not valid");
            }
            other => panic!("Expected remote error, got {other:?}"),
        }
        // Non-429 failures are not retried
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_exhaustion_propagates() {
        let (client, calls, _) =
            client_with(RecordingTransport::replying(429, "quota"), Some("k"));
        let err = client.analyze(&wheat(), &image()).await.unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::TransportExhausted { attempts: 3, .. }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_missing_text_is_empty_response() {
        let body = serde_json::json!({"candidates": []}).to_string();
        let (client, _, _) = client_with(RecordingTransport::replying(200, &body), Some("k"));
        let err = client.analyze(&wheat(), &image()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_null_candidates_is_empty_response() {
        let body = serde_json::json!({"candidates": null}).to_string();
        let (client, _, _) = client_with(RecordingTransport::replying(200, &body), Some("k"));
        let err = client.analyze(&wheat(), &image()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_null_parts_is_empty_response() {
        let body = serde_json::json!({
            "candidates": [{"content": {"role": "model", "parts": null}}]
        })
        .to_string();
        let (client, _, _) = client_with(RecordingTransport::replying(200, &body), Some("k"));
        let err = client.analyze(&wheat(), &image()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_blank_text_is_empty_response() {
        let (client, _, _) =
            client_with(RecordingTransport::replying(200, &envelope("  ")), Some("k"));
        let err = client.analyze(&wheat(), &image()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_non_json_envelope_is_malformed() {
        let (client, _, _) =
            client_with(RecordingTransport::replying(200, "<html>oops</html>"), Some("k"));
        let err = client.analyze(&wheat(), &image()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_prose_without_object_is_malformed() {
        let (client, _, _) = client_with(
            RecordingTransport::replying(200, &envelope("The wheat looks fine.")),
            Some("k"),
        );
        let err = client.analyze(&wheat(), &image()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedResponse(_)));
    }
}
