//! Primary predictor: zero-inflated log-link count model

use super::artifact::{LinearBlock, ModelArtifact, OutputModel};
use super::{DemandPrediction, DemandPredictor};
use crate::app::services::feature_reconciler::{CanonicalFeatures, FeatureValue, VariantSpec};
use crate::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone)]
pub struct CountModelPredictor {
    artifact: ModelArtifact,
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl CountModelPredictor {
    /// Wrap an artifact after checking it against the variant it will serve
    pub fn new(artifact: ModelArtifact, spec: &VariantSpec) -> Result<Self> {
        artifact.validate_against(spec)?;
        Ok(Self { artifact })
    }

    /// Load and validate an artifact file
    pub fn from_file(path: &Path, spec: &VariantSpec) -> Result<Self> {
        let predictor = Self::new(ModelArtifact::from_file(path)?, spec)?;
        info!(
            "Loaded count model for variant '{}' from {}",
            spec.name,
            path.display()
        );
        Ok(predictor)
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Numeric, imputed and standardized inputs by feature name
    fn prepare_inputs<'a>(&self, features: &'a CanonicalFeatures) -> Result<HashMap<&'a str, f64>> {
        let mut inputs = HashMap::with_capacity(features.len());
        for (name, value) in features.iter() {
            let raw = match value {
                FeatureValue::Number(v) => v,
                FeatureValue::Unknown => match self.artifact.imputation.get(name) {
                    Some(imputed) => *imputed,
                    None => return Err(Error::invalid_numeric(name, "unknown")),
                },
            };
            let scaled = match self.artifact.scaling.get(name) {
                Some(scaling) => (raw - scaling.mean) / scaling.scale,
                None => raw,
            };
            inputs.insert(name, scaled);
        }
        Ok(inputs)
    }

    fn linear(block: &LinearBlock, inputs: &HashMap<&str, f64>) -> f64 {
        block.intercept
            + block
                .coefficients
                .iter()
                .map(|(name, coefficient)| coefficient * inputs.get(name.as_str()).copied().unwrap_or(0.0))
                .sum::<f64>()
    }

    /// Expected count: exp(count) scaled by the probability of not being a structural zero
    fn expected(model: &OutputModel, inputs: &HashMap<&str, f64>) -> f64 {
        let mean = Self::linear(&model.count, inputs).exp();
        match &model.zero_inflation {
            Some(inflation) => mean * (1.0 - sigmoid(Self::linear(inflation, inputs))),
            None => mean,
        }
    }
}

impl DemandPredictor for CountModelPredictor {
    fn model_type(&self) -> &str {
        "count_model"
    }

    fn predict(&self, features: &CanonicalFeatures) -> Result<DemandPrediction> {
        if features.variant() != self.artifact.variant {
            return Err(Error::model_artifact(format!(
                "Model serves variant '{}' but received features for '{}'",
                self.artifact.variant,
                features.variant()
            )));
        }

        let inputs = self.prepare_inputs(features)?;
        Ok(DemandPrediction::from_raw(
            Self::expected(&self.artifact.arrivals, &inputs),
            Self::expected(&self.artifact.departures, &inputs),
        ))
    }
}
