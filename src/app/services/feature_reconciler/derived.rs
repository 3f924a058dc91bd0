//! Engineered proxy features
//!
//! The transit stop estimate is a heuristic stand-in derived from a raw
//! distance, never a measurement; [`TransitStops`] keeps the two apart.

use super::raw_request::RawRequest;
use super::temporal::TemporalFeatures;
use super::weather::{Reading, WeatherFeatures};
use crate::Result;
use crate::constants::{NIGHT_HOURS, TRANSIT_STOP_BUCKETS, fields};
use serde::Serialize;

/// Where a transit stop count came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "count", rename_all = "snake_case")]
pub enum TransitStops {
    /// Count supplied by the caller
    Measured(u32),
    /// Bucketed estimate from distance to the nearest stop
    Estimated(u32),
    /// Neither a count nor a distance was supplied
    NotAvailable,
}

impl TransitStops {
    pub fn count(&self) -> Option<u32> {
        match self {
            TransitStops::Measured(n) | TransitStops::Estimated(n) => Some(*n),
            TransitStops::NotAvailable => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedFeatures {
    pub is_night: bool,
    pub transit_stops: TransitStops,
    /// Precipitation, else rainfall; `None` leaves the variant default to apply
    pub precipitation: Option<f64>,
    /// Average temperature, else generic temperature; `None` as above
    pub avg_temperature: Option<f64>,
}

pub fn is_night(hour: i64) -> bool {
    NIGHT_HOURS.contains(&hour)
}

/// Stop count standing in for a distance to transit in metres
pub fn estimate_transit_stops(distance_m: f64) -> u32 {
    TRANSIT_STOP_BUCKETS
        .iter()
        .find(|(limit, _)| distance_m < *limit)
        .map_or(0, |(_, stops)| *stops)
}

fn measured_count(value: f64) -> u32 {
    if value <= 0.0 {
        0
    } else {
        value.round().min(u32::MAX as f64) as u32
    }
}

/// Compute derived features once temporal and weather fields are settled
pub fn calculate_derived(
    request: &RawRequest,
    temporal: &TemporalFeatures,
    weather: &WeatherFeatures,
) -> Result<DerivedFeatures> {
    let transit_stops = match request.number(fields::TRANSIT_STOP_COUNT)? {
        Some(count) => TransitStops::Measured(measured_count(count)),
        None => match request.number(fields::DIST_TO_TRANSIT)? {
            Some(distance) => TransitStops::Estimated(estimate_transit_stops(distance)),
            None => TransitStops::NotAvailable,
        },
    };

    let precipitation = match weather.precipitation {
        Reading::Reported(amount) => Some(amount),
        Reading::NotReported => request.number(fields::RAINFALL)?,
    };

    let avg_temperature = match request.number(fields::AVG_TEMPERATURE)? {
        Some(value) => Some(value),
        None => request.number(fields::TEMPERATURE)?,
    };

    Ok(DerivedFeatures {
        is_night: is_night(temporal.hour),
        transit_stops,
        precipitation,
        avg_temperature,
    })
}
