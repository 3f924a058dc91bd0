//! Startup predictor selection

use super::count_model::CountModelPredictor;
use super::heuristic::HeuristicPredictor;
use super::DemandPredictor;
use crate::app::services::feature_reconciler::VariantSpec;
use crate::config::ModelConfig;
use crate::{Error, Result};
use tracing::{info, warn};

/// Build the primary predictor, or the heuristic fallback when allowed
///
/// The primary is a [`CountModelPredictor`] loaded from the configured
/// artifact and validated against `spec`. If there is no artifact, or it fails
/// to load, the fallback is returned when `allow_fallback` is set; otherwise
/// the failure is returned.
pub fn select_predictor(config: &ModelConfig, spec: &VariantSpec) -> Result<Box<dyn DemandPredictor>> {
    let primary = match &config.artifact_path {
        Some(path) => CountModelPredictor::from_file(path, spec),
        None => Err(Error::model_artifact("No model artifact configured")),
    };

    match primary {
        Ok(predictor) => {
            info!("Using count model predictor for variant '{}'", spec.name);
            Ok(Box::new(predictor))
        }
        Err(e) if config.allow_fallback => {
            warn!("Primary predictor unavailable ({}), using heuristic fallback", e);
            Ok(Box::new(HeuristicPredictor::new()))
        }
        Err(e) => Err(e),
    }
}
