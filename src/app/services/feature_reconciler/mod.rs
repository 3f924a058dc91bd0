//! Request feature reconciliation
//!
//! Turns a partially populated, possibly redundantly encoded prediction
//! request into the complete, ordered feature vector a model variant expects.
//!
//! - [`raw_request`] - alias-aware access to the open request map
//! - [`temporal`] - day-of-week, hour, month, weekend and hour-of-week
//! - [`weather`] - temperature sentinel and zero-default precipitation
//! - [`derived`] - night flag, transit stop estimate and fallbacks
//! - [`variants`] - per-variant manifests and rule tables
//! - [`assembler`] - all-or-nothing vector assembly in manifest order
//! - [`reconciler`] - the per-request pipeline and parallel batches

pub mod assembler;
pub mod derived;
pub mod raw_request;
pub mod reconciler;
pub mod temporal;
pub mod variants;
pub mod weather;

#[cfg(test)]
pub mod tests;

// Re-export main types for convenience
pub use assembler::{CanonicalFeatures, FeatureValue};
pub use raw_request::{RawRequest, RequestEntry, parse_requests};
pub use reconciler::{BatchReconciliation, FeatureReconciler, ReconcileStats};
pub use temporal::{TemporalFeatures, TemporalInput, reconcile_temporal};
pub use variants::{CanonicalField, Derivation, FieldRule, VariantRegistry, VariantSpec};
pub use weather::{Reading, Temperature, WeatherFeatures};
