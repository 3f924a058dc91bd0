//! Demand prediction over canonical feature vectors
//!
//! The model itself is opaque to the rest of the crate: anything that turns a
//! [`CanonicalFeatures`] record into an arrival and departure count implements
//! [`DemandPredictor`]. The predictor is chosen once at startup by
//! [`select_predictor`] and then passed explicitly to whoever needs it.

use crate::Result;
use crate::app::services::feature_reconciler::CanonicalFeatures;
use crate::constants::MAX_PREDICTED_COUNT;
use serde::Serialize;

pub mod artifact;
pub mod count_model;
pub mod heuristic;
pub mod selection;

// Re-export main types for convenience
pub use artifact::{LinearBlock, ModelArtifact, OutputModel, Scaling};
pub use count_model::CountModelPredictor;
pub use heuristic::HeuristicPredictor;
pub use selection::select_predictor;

/// Predicted counts for one station and hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DemandPrediction {
    pub arrivals: u32,
    pub departures: u32,
}

impl DemandPrediction {
    /// Clip raw model outputs into range and round them
    pub fn from_raw(arrivals: f64, departures: f64) -> Self {
        Self {
            arrivals: finalize_count(arrivals),
            departures: finalize_count(departures),
        }
    }
}

/// Clip a raw count to `[0, MAX_PREDICTED_COUNT]` and round; NaN becomes 0
pub fn finalize_count(raw: f64) -> u32 {
    if raw.is_nan() {
        return 0;
    }
    raw.clamp(0.0, MAX_PREDICTED_COUNT).round() as u32
}

/// Capability shared by every demand model
pub trait DemandPredictor: Send + Sync + std::fmt::Debug {
    /// Short label reported alongside predictions
    fn model_type(&self) -> &str;

    /// Predict arrivals and departures for one feature vector
    fn predict(&self, features: &CanonicalFeatures) -> Result<DemandPrediction>;
}
