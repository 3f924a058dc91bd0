//! Predict command: reconcile requests and run the selected predictor

use super::shared::{load_configuration, print_status, read_requests, resolve_variant, write_json};
use crate::app::models::RowIssue;
use crate::app::services::feature_reconciler::{CanonicalFeatures, FeatureReconciler};
use crate::app::services::predictor::{DemandPredictor, select_predictor};
use crate::cli::args::PredictArgs;
use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

/// Prediction for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationPrediction {
    /// Position of the request in the input
    pub request: usize,
    pub arrivals: u32,
    pub departures: u32,
}

/// JSON document written by the predict command
#[derive(Debug, Serialize)]
pub struct PredictOutput {
    pub predictions: Vec<StationPrediction>,
    pub model_type: String,
    pub num_stations: usize,
    pub errors: Vec<RowIssue>,
}

/// Predict every reconciled request; failures join the reconciliation issues
pub fn predict_all(
    predictor: &dyn DemandPredictor,
    features: &[Option<CanonicalFeatures>],
    mut errors: Vec<RowIssue>,
) -> PredictOutput {
    let mut predictions = Vec::with_capacity(features.len());

    for (row, vector) in features.iter().enumerate() {
        let Some(vector) = vector else {
            continue;
        };
        match predictor.predict(vector) {
            Ok(prediction) => predictions.push(StationPrediction {
                request: row,
                arrivals: prediction.arrivals,
                departures: prediction.departures,
            }),
            Err(e) => {
                warn!("Prediction failed for request {}: {}", row, e);
                errors.push(RowIssue::from_error(row, &e));
            }
        }
    }

    errors.sort_by_key(|issue| issue.row);

    PredictOutput {
        num_stations: predictions.len(),
        predictions,
        model_type: predictor.model_type().to_string(),
        errors,
    }
}

/// Run the predict command
pub async fn run_predict(args: PredictArgs) -> Result<()> {
    let config = load_configuration(&args.common, |config| args.apply_overrides(config))?;
    let spec = resolve_variant(&config)?;
    let predictor = select_predictor(&config.model, &spec)?;
    info!("Predictor: {}", predictor.model_type());

    let requests = read_requests(&args.input).await?;
    let reconciler = FeatureReconciler::new(spec);
    let batch = reconciler.reconcile_entries(&requests, config.matching.workers)?;

    let output = predict_all(predictor.as_ref(), &batch.features, batch.issues);

    if !args.common.quiet {
        print_status(
            output.errors.len(),
            &format!(
                "Predicted {}/{} requests with {} model",
                output.num_stations,
                requests.len(),
                output.model_type
            ),
        );
    }

    write_json(&output, args.output.as_deref()).await
}
