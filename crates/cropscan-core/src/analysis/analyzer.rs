//! The fail-soft analysis entry point.
//!
//! `Analyzer` chains encode → remote client and, when any stage fails, logs
//! the error and substitutes a simulated assessment. Nothing it returns is an
//! error: callers only ever see a populated `AnalysisResult`.

use super::encode::{AnalysisRequest, ImageFile};
use super::gemini::GeminiClient;
use super::retry::{BackoffPolicy, RetryingTransport};
use super::simulator::Simulator;
use super::transport::HttpTransport;
use crate::config::{Config, LimitsConfig};
use crate::error::{AnalysisError, PipelineResult};
use crate::types::{AnalysisResult, Assessment, ProductLabel, Provenance};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Produce quality analyzer with a simulated fallback.
pub struct Analyzer {
    client: GeminiClient,
    /// `None` when the fallback is disabled
    simulator: Option<Simulator>,
    max_image_bytes: u64,
}

impl Analyzer {
    /// Build an analyzer from injected parts.
    pub fn new(client: GeminiClient, simulator: Option<Simulator>) -> Self {
        Self {
            client,
            simulator,
            max_image_bytes: LimitsConfig::default().max_image_bytes(),
        }
    }

    /// Build an analyzer backed by reqwest, resolving the credential from
    /// `config.gemini.api_key`.
    pub fn from_config(config: &Config) -> Self {
        let timeout = Duration::from_millis(config.limits.request_timeout_ms);
        let retrying = RetryingTransport::new(
            Arc::new(HttpTransport::new(timeout)),
            BackoffPolicy::from(&config.retry),
        );
        let client = GeminiClient::from_config(&config.gemini, retrying);
        if !client.has_credential() {
            tracing::warn!("No Gemini API key configured; analyses will use simulated results");
        }

        let simulator = config
            .simulator
            .enabled
            .then(|| Simulator::from(&config.simulator));

        Self::new(client, simulator).with_max_image_bytes(config.limits.max_image_bytes())
    }

    pub fn with_max_image_bytes(mut self, max_image_bytes: u64) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    /// Analyze `image` as `label`. Always returns a result.
    pub async fn analyze(&self, label: &ProductLabel, image: &ImageFile) -> AnalysisResult {
        self.assess(label, image).await.result
    }

    /// Analyze `image` as `label`, reporting where the result came from.
    pub async fn assess(&self, label: &ProductLabel, image: &ImageFile) -> Assessment {
        let span = tracing::info_span!("analyze", product = %label);
        async {
            match self.try_remote(label, image).await {
                Ok(result) => {
                    tracing::info!(
                        "Remote assessment: grade {} ({}% confidence)",
                        result.overall_quality,
                        result.confidence
                    );
                    Assessment {
                        result,
                        provenance: Provenance::Remote,
                    }
                }
                Err(e) => self.fall_back(label, e).await,
            }
        }
        .instrument(span)
        .await
    }

    async fn try_remote(
        &self,
        label: &ProductLabel,
        image: &ImageFile,
    ) -> PipelineResult<AnalysisResult> {
        let request = AnalysisRequest::load(label, image, self.max_image_bytes).await?;
        let encoded = request.encode();
        tracing::debug!(
            "Encoded {} bytes of {} for {}",
            request.image_bytes.len(),
            encoded.mime_type,
            self.client.model()
        );
        self.client.analyze(&request.product_label, &encoded).await
    }

    async fn fall_back(&self, label: &ProductLabel, error: AnalysisError) -> Assessment {
        match &self.simulator {
            Some(simulator) => {
                tracing::warn!("AI analysis failed, using simulated result: {error}");
                Assessment {
                    result: simulator.run(label).await,
                    provenance: Provenance::Simulated,
                }
            }
            None => {
                tracing::error!("AI analysis failed: {error}");
                Assessment {
                    result: AnalysisResult::failure(label, error.to_string()),
                    provenance: Provenance::Failed,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::transport::{HttpRequest, HttpResponse, Transport, TransportFault};
    use crate::config::GeminiConfig;
    use async_trait::async_trait;
    use std::io::Write;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// A configurable mock transport for orchestrator tests.
    struct MockTransport {
        response_fn: Box<dyn Fn(u32) -> Result<HttpResponse, TransportFault> + Send + Sync>,
        call_count: Arc<AtomicU32>,
    }

    impl MockTransport {
        fn replying(status: u16, body: String) -> Self {
            Self {
                response_fn: Box::new(move |_| Ok(HttpResponse::new(status, body.clone()))),
                call_count: Arc::new(AtomicU32::new(0)),
            }
        }

        fn verdict(text: &str) -> Self {
            let body = serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": text}]}}]
            })
            .to_string();
            Self::replying(200, body)
        }

        fn call_count_handle(&self) -> Arc<AtomicU32> {
            self.call_count.clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn post_json(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportFault> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            (self.response_fn)(idx)
        }
    }

    const GOOD_VERDICT: &str = "Here you go: {\"productName\":\"apple\",\
        \"freshnessStatus\":\"Fresh\",\"overallQuality\":\"A\",\"confidence\":0.88,\
        \"justification\":\"firm skin, no bruising\"}";

    fn analyzer(
        transport: MockTransport,
        api_key: Option<&str>,
        simulator: Option<Simulator>,
    ) -> Analyzer {
        let policy = BackoffPolicy {
            max_attempts: 2,
            base_delay_ms: 10,
            max_jitter_ms: 0,
        };
        let client = GeminiClient::new(
            &GeminiConfig::default(),
            api_key.map(String::from),
            RetryingTransport::new(Arc::new(transport), policy),
        );
        Analyzer::new(client, simulator)
    }

    fn instant_simulator() -> Option<Simulator> {
        Some(Simulator::new(Duration::ZERO))
    }

    fn apple() -> ProductLabel {
        ProductLabel::new("apple").unwrap()
    }

    fn image_fixture() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        file
    }

    fn assert_well_formed(result: &AnalysisResult) {
        assert!(!result.product_name.is_empty());
        assert!(result.confidence <= 100);
        assert!(!result.freshness_status.is_empty());
        assert!(!result.overall_quality.is_empty());
    }

    #[tokio::test]
    async fn test_remote_success() {
        let file = image_fixture();
        let analyzer = analyzer(
            MockTransport::verdict(GOOD_VERDICT),
            Some("k"),
            instant_simulator(),
        );

        let assessment = analyzer.assess(&apple(), &ImageFile::new(file.path())).await;
        assert_eq!(assessment.provenance, Provenance::Remote);
        assert_eq!(assessment.result.confidence, 88);
        assert_eq!(assessment.result.justification, "firm skin, no bruising");
    }

    #[tokio::test]
    async fn test_analyze_returns_bare_result() {
        let file = image_fixture();
        let analyzer = analyzer(
            MockTransport::verdict(GOOD_VERDICT),
            Some("k"),
            instant_simulator(),
        );

        let result = analyzer.analyze(&apple(), &ImageFile::new(file.path())).await;
        assert_eq!(result.overall_quality, "A");
        assert_well_formed(&result);
    }

    #[tokio::test]
    async fn test_missing_credential_falls_back() {
        let file = image_fixture();
        let transport = MockTransport::verdict(GOOD_VERDICT);
        let calls = transport.call_count_handle();
        let analyzer = analyzer(transport, None, instant_simulator());

        let assessment = analyzer.assess(&apple(), &ImageFile::new(file.path())).await;
        assert_eq!(assessment.provenance, Provenance::Simulated);
        assert_eq!(assessment.result.product_name, "apple");
        assert!(assessment.result.justification.starts_with("Mock analysis"));
        assert_well_formed(&assessment.result);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unreadable_image_falls_back_without_network() {
        let transport = MockTransport::verdict(GOOD_VERDICT);
        let calls = transport.call_count_handle();
        let analyzer = analyzer(transport, Some("k"), instant_simulator());

        let image = ImageFile::new("/nonexistent/path/apple.jpg");
        let assessment = analyzer.assess(&apple(), &image).await;
        assert_eq!(assessment.provenance, Provenance::Simulated);
        assert_well_formed(&assessment.result);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_oversized_image_falls_back() {
        let file = image_fixture();
        let transport = MockTransport::verdict(GOOD_VERDICT);
        let calls = transport.call_count_handle();
        let analyzer =
            analyzer(transport, Some("k"), instant_simulator()).with_max_image_bytes(2);

        let assessment = analyzer.assess(&apple(), &ImageFile::new(file.path())).await;
        assert_eq!(assessment.provenance, Provenance::Simulated);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_remote_error_falls_back() {
        let file = image_fixture();
        let analyzer = analyzer(
            MockTransport::replying(500, "internal".to_string()),
            Some("k"),
            instant_simulator(),
        );

        let assessment = analyzer.assess(&apple(), &ImageFile::new(file.path())).await;
        assert_eq!(assessment.provenance, Provenance::Simulated);
        assert_well_formed(&assessment.result);
    }

    #[tokio::test]
    async fn test_malformed_output_falls_back() {
        let file = image_fixture();
        let analyzer = analyzer(
            MockTransport::verdict("Looks like a nice apple!"),
            Some("k"),
            instant_simulator(),
        );

        let assessment = analyzer.assess(&apple(), &ImageFile::new(file.path())).await;
        assert_eq!(assessment.provenance, Provenance::Simulated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_exhaustion_falls_back() {
        let file = image_fixture();
        let transport = MockTransport::replying(429, "quota".to_string());
        let calls = transport.call_count_handle();
        let analyzer = analyzer(transport, Some("k"), Some(Simulator::default()));

        let assessment = analyzer.assess(&apple(), &ImageFile::new(file.path())).await;
        assert_eq!(assessment.provenance, Provenance::Simulated);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_well_formed(&assessment.result);
    }

    #[tokio::test]
    async fn test_disabled_fallback_reports_failure() {
        let file = image_fixture();
        let analyzer = analyzer(
            MockTransport::replying(403, "forbidden".to_string()),
            Some("k"),
            None,
        );

        let assessment = analyzer.assess(&apple(), &ImageFile::new(file.path())).await;
        assert_eq!(assessment.provenance, Provenance::Failed);
        assert!(assessment.result.is_failure());
        assert_eq!(assessment.result.freshness_status, "N/A");
        assert_eq!(assessment.result.confidence, 0);
        assert!(assessment.result.justification.contains("403"));
        assert!(assessment.result.justification.contains("forbidden"));
    }

    #[tokio::test]
    async fn test_from_config_without_key_still_answers() {
        let mut config = Config::default();
        config.gemini.api_key = String::new();
        config.simulator.latency_ms = 0;
        let analyzer = Analyzer::from_config(&config);

        let file = image_fixture();
        let result = analyzer.analyze(&apple(), &ImageFile::new(file.path())).await;
        assert_eq!(result.product_name, "apple");
        assert_well_formed(&result);
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_independent() {
        let file = image_fixture();
        let transport = MockTransport::verdict(GOOD_VERDICT);
        let calls = transport.call_count_handle();
        let analyzer = analyzer(transport, Some("k"), instant_simulator());
        let image = ImageFile::new(file.path());
        let label = apple();

        let (a, b) = tokio::join!(
            analyzer.assess(&label, &image),
            analyzer.assess(&label, &image)
        );
        assert_eq!(a.provenance, Provenance::Remote);
        assert_eq!(b.provenance, Provenance::Remote);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
