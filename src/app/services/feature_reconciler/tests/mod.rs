//! Shared test utilities and fixtures for feature reconciliation tests

use crate::app::services::feature_reconciler::{
    CanonicalFeatures, FeatureReconciler, RawRequest, VariantRegistry,
};
use serde_json::Value;

pub mod assembler_tests;
pub mod reconciler_tests;

pub fn request(value: Value) -> RawRequest {
    RawRequest::from_value(value).unwrap()
}

pub fn reconciler(variant: &str) -> FeatureReconciler {
    FeatureReconciler::new(VariantRegistry::builtin().get(variant).unwrap().clone())
}

/// Feature value as a plain number, panicking on the unknown sentinel
pub fn number(features: &CanonicalFeatures, name: &str) -> f64 {
    features
        .get(name)
        .and_then(|v| v.number())
        .unwrap_or_else(|| panic!("feature '{}' has no number", name))
}
