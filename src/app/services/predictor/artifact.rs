//! Count model artifact format
//!
//! An artifact is a JSON document holding, for arrivals and departures, a
//! log-link linear block and an optional logistic zero-inflation block, plus
//! optional per-feature standardization and imputation values.
//!
//! ```json
//! {
//!   "variant": "zinb",
//!   "imputation": { "avg_temp": 18.0 },
//!   "scaling": { "month": { "mean": 6.5, "scale": 3.45 } },
//!   "arrivals": {
//!     "count": { "intercept": 1.2, "coefficients": { "start_hour": 0.04 } },
//!     "zero_inflation": { "intercept": -1.5, "coefficients": { "is_night": 2.1 } }
//!   },
//!   "departures": { "count": { "intercept": 1.1, "coefficients": {} } }
//! }
//! ```

use crate::app::services::feature_reconciler::VariantSpec;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Intercept plus named coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearBlock {
    pub intercept: f64,
    #[serde(default)]
    pub coefficients: BTreeMap<String, f64>,
}

impl LinearBlock {
    fn validate(&self, label: &str, manifest: &[String]) -> Result<()> {
        if !self.intercept.is_finite() {
            return Err(Error::model_artifact(format!(
                "{} intercept is not finite",
                label
            )));
        }
        for (name, coefficient) in &self.coefficients {
            if !manifest.contains(name) {
                return Err(Error::model_artifact(format!(
                    "{} coefficient '{}' is not a feature of the variant",
                    label, name
                )));
            }
            if !coefficient.is_finite() {
                return Err(Error::model_artifact(format!(
                    "{} coefficient '{}' is not finite",
                    label, name
                )));
            }
        }
        Ok(())
    }
}

/// Model for one output: log-link count block with optional zero inflation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputModel {
    pub count: LinearBlock,
    #[serde(default)]
    pub zero_inflation: Option<LinearBlock>,
}

/// Standardization applied to a feature before the linear predictor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scaling {
    pub mean: f64,
    pub scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Variant whose manifest this model was trained on
    pub variant: String,

    /// Replacement values for features carrying the unknown sentinel
    #[serde(default)]
    pub imputation: BTreeMap<String, f64>,

    #[serde(default)]
    pub scaling: BTreeMap<String, Scaling>,

    pub arrivals: OutputModel,
    pub departures: OutputModel,
}

impl ModelArtifact {
    /// Read an artifact from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Reading model artifact: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(
                format!("Failed to read model artifact '{}'", path.display()),
                e,
            )
        })?;
        serde_json::from_str(&content).map_err(|e| {
            Error::model_artifact(format!(
                "Malformed model artifact '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Check the artifact fits a variant's manifest
    pub fn validate_against(&self, spec: &VariantSpec) -> Result<()> {
        if self.variant != spec.name {
            return Err(Error::model_artifact(format!(
                "Artifact was built for variant '{}', not '{}'",
                self.variant, spec.name
            )));
        }

        let manifest = &spec.manifest;
        for (label, output) in [("arrivals", &self.arrivals), ("departures", &self.departures)] {
            output.count.validate(&format!("{} count", label), manifest)?;
            if let Some(inflation) = &output.zero_inflation {
                inflation.validate(&format!("{} zero-inflation", label), manifest)?;
            }
        }

        for (name, value) in &self.imputation {
            if !manifest.contains(name) || !value.is_finite() {
                return Err(Error::model_artifact(format!(
                    "Invalid imputation entry for '{}'",
                    name
                )));
            }
        }

        for (name, scaling) in &self.scaling {
            if !manifest.contains(name)
                || !scaling.mean.is_finite()
                || !scaling.scale.is_finite()
                || scaling.scale <= 0.0
            {
                return Err(Error::model_artifact(format!(
                    "Invalid scaling entry for '{}'",
                    name
                )));
            }
        }

        Ok(())
    }
}
