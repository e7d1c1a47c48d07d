//! Local stand-in for the remote service.
//!
//! Produces a plausible assessment without network access so callers always
//! get a result. The artificial latency keeps loading states consistent
//! between the remote and simulated paths.

use crate::config::SimulatorConfig;
use crate::types::{AnalysisResult, ProductLabel};
use rand::Rng;
use std::time::Duration;

/// Outcome bucket selected by a uniform draw in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityBucket {
    /// `r > 0.7`
    Fresh,
    /// `0.4 < r <= 0.7`
    Ripe,
    /// `r <= 0.4`
    Stale,
}

impl QualityBucket {
    pub fn from_draw(r: f64) -> Self {
        if r > 0.7 {
            QualityBucket::Fresh
        } else if r > 0.4 {
            QualityBucket::Ripe
        } else {
            QualityBucket::Stale
        }
    }

    pub fn grade(self) -> &'static str {
        match self {
            QualityBucket::Fresh => "A",
            QualityBucket::Ripe => "B",
            QualityBucket::Stale => "D",
        }
    }

    pub fn freshness(self) -> &'static str {
        match self {
            QualityBucket::Fresh => "Fresh",
            QualityBucket::Ripe => "Ripe",
            QualityBucket::Stale => "Stale",
        }
    }

    pub fn consumable(self) -> bool {
        !matches!(self, QualityBucket::Stale)
    }
}

/// Generate a simulated assessment from `rng`.
pub fn simulate<R: Rng + ?Sized>(label: &ProductLabel, rng: &mut R) -> AnalysisResult {
    let bucket = QualityBucket::from_draw(rng.gen::<f64>());
    let freshness = bucket.freshness();

    AnalysisResult {
        product_name: label.to_string(),
        freshness_status: freshness.to_string(),
        overall_quality: bucket.grade().to_string(),
        confidence: rng.gen_range(80..100),
        justification: format!(
            "Mock analysis indicates {} condition.",
            freshness.to_lowercase()
        ),
        consumable: Some(bucket.consumable()),
    }
}

/// Simulated analysis with emulated latency.
#[derive(Debug, Clone)]
pub struct Simulator {
    latency: Duration,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::from(&SimulatorConfig::default())
    }
}

impl From<&SimulatorConfig> for Simulator {
    fn from(config: &SimulatorConfig) -> Self {
        Self::new(Duration::from_millis(config.latency_ms))
    }
}

impl Simulator {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Wait out the emulated latency, then return a simulated result.
    pub async fn run(&self, label: &ProductLabel) -> AnalysisResult {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        simulate(label, &mut rand::thread_rng())
    }
}
