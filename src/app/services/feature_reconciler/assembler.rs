//! Canonical feature vector assembly
//!
//! Assembly is all-or-nothing: either every manifest feature resolves and the
//! full vector is returned in manifest order, or a single `MissingFeature`
//! error names every feature that did not.

use super::derived::DerivedFeatures;
use super::raw_request::RawRequest;
use super::temporal::TemporalFeatures;
use super::variants::{CanonicalField, Derivation, VariantSpec};
use super::weather::{Temperature, WeatherFeatures};
use crate::{Error, Result};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

/// One feature value; `Unknown` is the temperature sentinel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    Number(f64),
    Unknown,
}

impl FeatureValue {
    pub fn number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(v) => Some(*v),
            FeatureValue::Unknown => None,
        }
    }

    /// Numeric view, with `Unknown` as NaN
    pub fn as_f64(&self) -> f64 {
        self.number().unwrap_or(f64::NAN)
    }

    fn flag(value: bool) -> Self {
        FeatureValue::Number(if value { 1.0 } else { 0.0 })
    }
}

impl Serialize for FeatureValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FeatureValue::Number(v) => serializer.serialize_f64(*v),
            FeatureValue::Unknown => serializer.serialize_none(),
        }
    }
}

/// Complete, ordered feature record for one model variant
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalFeatures {
    variant: String,
    names: Vec<String>,
    values: Vec<FeatureValue>,
}

impl CanonicalFeatures {
    /// Build directly from parallel name and value lists
    pub fn new(
        variant: impl Into<String>,
        names: Vec<String>,
        values: Vec<FeatureValue>,
    ) -> Result<Self> {
        let variant = variant.into();
        if names.len() != values.len() {
            return Err(Error::configuration(format!(
                "Variant '{}' has {} feature names but {} values",
                variant,
                names.len(),
                values.len()
            )));
        }
        Ok(Self {
            variant,
            names,
            values,
        })
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// Feature names in manifest order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Feature values in manifest order
    pub fn values(&self) -> &[FeatureValue] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<FeatureValue> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|index| self.values[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, FeatureValue)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Positional numeric vector, unknowns as NaN
    pub fn to_vector(&self) -> Vec<f64> {
        self.values.iter().map(FeatureValue::as_f64).collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

struct OrderedFeatures<'a>(&'a CanonicalFeatures);

impl Serialize for OrderedFeatures<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

impl Serialize for CanonicalFeatures {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CanonicalFeatures", 2)?;
        state.serialize_field("variant", &self.variant)?;
        state.serialize_field("features", &OrderedFeatures(self))?;
        state.end()
    }
}

/// Everything the assembler reads for one request
#[derive(Debug, Clone, Copy)]
pub struct ResolvedRequest<'a> {
    pub raw: &'a RawRequest,
    pub temporal: &'a TemporalFeatures,
    pub weather: &'a WeatherFeatures,
    pub derived: &'a DerivedFeatures,
}

fn temperature(value: Temperature) -> FeatureValue {
    value
        .value()
        .map_or(FeatureValue::Unknown, FeatureValue::Number)
}

/// Value of a reconciled quantity; `None` only where the quantity can be absent
fn canonical_value(field: CanonicalField, request: &ResolvedRequest<'_>) -> Option<FeatureValue> {
    let temporal = request.temporal;
    let number = |v: i64| Some(FeatureValue::Number(v as f64));

    match field {
        CanonicalField::DayOfWeek => number(temporal.day_of_week),
        CanonicalField::Hour => number(temporal.hour),
        CanonicalField::NextHour => number(temporal.next_hour()),
        CanonicalField::Month => number(temporal.month),
        CanonicalField::Weekend => Some(FeatureValue::flag(temporal.weekend)),
        CanonicalField::HourOfWeek => number(temporal.hour_of_week),
        CanonicalField::NextHourOfWeek => number(temporal.next_hour_of_week()),
        CanonicalField::IsNight => Some(FeatureValue::flag(request.derived.is_night)),
        CanonicalField::MaxTemp => Some(temperature(request.weather.max_temp)),
        CanonicalField::MinTemp => Some(temperature(request.weather.min_temp)),
        CanonicalField::Snowfall => Some(FeatureValue::Number(request.weather.snowfall.amount())),
        CanonicalField::Precipitation => request.derived.precipitation.map(FeatureValue::Number),
        CanonicalField::AvgTemperature => {
            request.derived.avg_temperature.map(FeatureValue::Number)
        }
        CanonicalField::TransitStops => request
            .derived
            .transit_stops
            .count()
            .map(|n| FeatureValue::Number(f64::from(n))),
    }
}

/// Request value supplied under the feature's own name, if any
fn supplied_value(
    feature: &str,
    field: CanonicalField,
    raw: &RawRequest,
) -> Result<Option<FeatureValue>> {
    match field {
        CanonicalField::IsNight => Ok(raw.flag(&[feature])?.map(FeatureValue::flag)),
        _ => Ok(raw.number(&[feature])?.map(FeatureValue::Number)),
    }
}

/// Build the variant's feature vector
///
/// A computed canonical feature (end hour, night flag) keeps a value the
/// request supplies under the feature's own name.
///
/// # Errors
/// * `Error::InvalidNumeric` if a raw feature holds a non-numeric value
/// * `Error::MissingFeature` naming every feature with no value and no default
pub fn assemble(spec: &VariantSpec, request: &ResolvedRequest<'_>) -> Result<CanonicalFeatures> {
    let mut values = Vec::with_capacity(spec.manifest.len());
    let mut missing = Vec::new();

    for feature in &spec.manifest {
        let rule = spec.rule_for(feature);
        let value = match &rule.derivation {
            Derivation::Canonical { field } if field.is_computed() => {
                match supplied_value(feature, *field, request.raw)? {
                    Some(value) => Some(value),
                    None => canonical_value(*field, request),
                }
            }
            Derivation::Canonical { field } => canonical_value(*field, request),
            Derivation::Raw { keys } => {
                let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
                request.raw.number(&keys)?.map(FeatureValue::Number)
            }
        };

        match value.or(rule.default.map(FeatureValue::Number)) {
            Some(value) => values.push(value),
            None => missing.push(feature.clone()),
        }
    }

    if !missing.is_empty() {
        return Err(Error::missing_feature(&spec.name, missing));
    }

    Ok(CanonicalFeatures {
        variant: spec.name.clone(),
        names: spec.manifest.clone(),
        values,
    })
}
