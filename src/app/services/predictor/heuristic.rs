//! Rule-based fallback predictor
//!
//! Estimates demand from time of day, weekend flag, season and distance to
//! downtown. Fully deterministic: the same features always give the same
//! counts. Features are read by name, so it serves any variant; quantities a
//! variant does not carry fall back to neutral values.

use super::{DemandPrediction, DemandPredictor};
use crate::Result;
use crate::app::services::feature_reconciler::CanonicalFeatures;

const HOUR_FEATURES: &[&str] = &["hour_of_day", "start_hour", "hr", "hour"];
const WEEKEND_FEATURES: &[&str] = &["is_weekend", "weekend"];
const MONTH_FEATURES: &[&str] = &["month"];
const LAT_FEATURES: &[&str] = &["station_lat"];
const LNG_FEATURES: &[&str] = &["station_lng"];
const UNIVERSITY_FEATURES: &[&str] = &["dist_university_m"];
const BUSINESS_FEATURES: &[&str] = &["dist_business"];

/// Downtown reference point (latitude, longitude)
const CITY_CENTER: (f64, f64) = (42.36, -71.06);

#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPredictor;

fn lookup(features: &CanonicalFeatures, names: &[&str], default: f64) -> f64 {
    names
        .iter()
        .find_map(|name| features.get(name).and_then(|v| v.number()))
        .unwrap_or(default)
}

impl HeuristicPredictor {
    pub fn new() -> Self {
        Self
    }

    /// Total trips expected in the hour before location and season
    fn base_demand(hour: i64, weekend: bool) -> f64 {
        if weekend {
            match hour {
                10..=18 => 19.5,
                19..=23 => 11.0,
                _ => 3.5,
            }
        } else {
            match hour {
                7..=9 | 17..=19 => 27.0,
                10..=16 => 14.5,
                20..=23 => 8.0,
                _ => 2.0,
            }
        }
    }

    fn season_multiplier(month: i64) -> f64 {
        match month {
            6..=8 => 1.2,
            11 | 12 | 1 | 2 => 0.7,
            _ => 1.0,
        }
    }

    /// Share of trips ending at the station
    ///
    /// Downtown stations fill in the morning rush and empty in the evening;
    /// outlying ones do the opposite.
    fn arrival_ratio(hour: i64, weekend: bool, downtown: bool) -> f64 {
        if weekend {
            return 0.5;
        }
        match hour {
            7..=9 => {
                if downtown {
                    0.7
                } else {
                    0.3
                }
            }
            17..=19 => {
                if downtown {
                    0.3
                } else {
                    0.7
                }
            }
            12..=14 => 0.55,
            _ => 0.5,
        }
    }
}

impl DemandPredictor for HeuristicPredictor {
    fn model_type(&self) -> &str {
        "heuristic"
    }

    fn predict(&self, features: &CanonicalFeatures) -> Result<DemandPrediction> {
        let hour = lookup(features, HOUR_FEATURES, 12.0) as i64;
        let weekend = lookup(features, WEEKEND_FEATURES, 0.0) != 0.0;
        let month = lookup(features, MONTH_FEATURES, 6.0) as i64;
        let lat = lookup(features, LAT_FEATURES, CITY_CENTER.0);
        let lng = lookup(features, LNG_FEATURES, CITY_CENTER.1);
        let dist_university = lookup(features, UNIVERSITY_FEATURES, 500.0);
        let dist_business = lookup(features, BUSINESS_FEATURES, 500.0);

        let from_center = ((lat - CITY_CENTER.0).powi(2) + (lng - CITY_CENTER.1).powi(2)).sqrt();
        let mut location = if from_center < 0.02 {
            1.3
        } else if from_center < 0.05 {
            1.1
        } else {
            0.9
        };
        if dist_university < 200.0 {
            location *= 1.2;
        }
        if dist_business < 300.0 {
            location *= 1.15;
        }

        let total = Self::base_demand(hour, weekend) * Self::season_multiplier(month) * location;
        let ratio = Self::arrival_ratio(hour, weekend, from_center < 0.05);

        Ok(DemandPrediction::from_raw(
            total * ratio,
            total * (1.0 - ratio),
        ))
    }
}
