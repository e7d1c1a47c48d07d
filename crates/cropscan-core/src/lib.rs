//! CropScan Core - produce quality analysis with a fail-soft fallback.
//!
//! CropScan takes a product label and a photo and returns a structured
//! freshness and quality assessment from a remote vision model. When the
//! remote path fails for any reason, a simulated assessment is substituted,
//! so callers always receive a usable result.
//!
//! # Architecture
//!
//! ```text
//! (label, image) → Encode → POST with retry (429 backoff) → Extract JSON → Result
//!                     └──────────── any failure ────────────→ Simulated result
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use cropscan_core::{Analyzer, Config, ImageFile, ProductLabel};
//!
//! #[tokio::main]
//! async fn main() -> cropscan_core::Result<()> {
//!     let config = Config::load()?;
//!     let analyzer = Analyzer::from_config(&config);
//!
//!     let label = ProductLabel::new("banana")?;
//!     let result = analyzer.analyze(&label, &ImageFile::new("./banana.jpg")).await;
//!     println!("Grade: {}", result.overall_quality);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod analysis;
pub mod config;
pub mod error;
pub mod types;

// Re-exports for convenient access
pub use analysis::{Analyzer, ImageFile};
pub use config::Config;
pub use error::{AnalysisError, ConfigError, CropScanError, PipelineResult, Result};
pub use types::{AnalysisResult, Assessment, CropOption, ProductLabel, Provenance, CROP_CATALOG};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
