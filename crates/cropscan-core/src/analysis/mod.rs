//! Remote produce analysis with a simulated fallback.
//!
//! The pipeline is encode → retrying transport → Gemini client → tolerant
//! JSON extraction, wrapped by `Analyzer`, which substitutes a simulated
//! assessment whenever any stage fails.

pub mod analyzer;
pub mod encode;
pub mod extract;
pub mod gemini;
pub mod retry;
pub mod simulator;
pub mod transport;

pub use analyzer::Analyzer;
pub use encode::{AnalysisRequest, EncodedImage, ImageFile};
pub use gemini::GeminiClient;
pub use retry::{BackoffPolicy, RetryingTransport};
pub use simulator::Simulator;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Transport, TransportFault};
