//! Weather field normalization
//!
//! Temperatures have no safe numeric default because zero is a real
//! reading, so an absent one becomes [`Temperature::Unknown`]. Absent
//! precipitation and snowfall mean "nothing reported" and read as zero, with
//! the provenance kept. No clamping or unit conversion happens here.

use super::raw_request::RawRequest;
use crate::Result;
use crate::constants::fields;
use serde::Serialize;

/// Temperature reading, or the distinguished unknown sentinel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Temperature {
    Known(f64),
    Unknown,
}

impl Temperature {
    pub fn from_option(value: Option<f64>) -> Self {
        value.map_or(Temperature::Unknown, Temperature::Known)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Temperature::Known(v) => Some(*v),
            Temperature::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Temperature::Known(_))
    }
}

/// Precipitation-style amount where absence reads as zero
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Reading {
    Reported(f64),
    NotReported,
}

impl Reading {
    pub fn from_option(value: Option<f64>) -> Self {
        value.map_or(Reading::NotReported, Reading::Reported)
    }

    /// Amount to use downstream
    pub fn amount(&self) -> f64 {
        match self {
            Reading::Reported(v) => *v,
            Reading::NotReported => 0.0,
        }
    }

    pub fn is_reported(&self) -> bool {
        matches!(self, Reading::Reported(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeatherFeatures {
    pub max_temp: Temperature,
    pub min_temp: Temperature,
    pub precipitation: Reading,
    pub snowfall: Reading,
}

/// Read and normalize the weather fields of a request
pub fn normalize_weather(request: &RawRequest) -> Result<WeatherFeatures> {
    Ok(WeatherFeatures {
        max_temp: Temperature::from_option(request.number(fields::MAX_TEMP)?),
        min_temp: Temperature::from_option(request.number(fields::MIN_TEMP)?),
        precipitation: Reading::from_option(request.number(fields::PRECIPITATION)?),
        snowfall: Reading::from_option(request.number(fields::SNOWFALL)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde_json::json;

    fn request(value: serde_json::Value) -> RawRequest {
        RawRequest::from_value(value).unwrap()
    }

    #[test]
    fn test_missing_temperatures_are_unknown_not_zero() {
        let weather = normalize_weather(&request(json!({}))).unwrap();
        assert_eq!(weather.max_temp, Temperature::Unknown);
        assert_eq!(weather.min_temp, Temperature::Unknown);
        assert_ne!(weather.max_temp, Temperature::Known(0.0));
    }

    #[test]
    fn test_zero_temperature_is_a_reading() {
        let weather = normalize_weather(&request(json!({"TMAX": 0, "min_temp": -7.5}))).unwrap();
        assert_eq!(weather.max_temp, Temperature::Known(0.0));
        assert_eq!(weather.min_temp.value(), Some(-7.5));
    }

    #[test]
    fn test_missing_precipitation_reads_as_zero() {
        let weather = normalize_weather(&request(json!({"PRCP": null}))).unwrap();
        assert_eq!(weather.precipitation, Reading::NotReported);
        assert_eq!(weather.precipitation.amount(), 0.0);
        assert_eq!(weather.snowfall.amount(), 0.0);
        assert!(!weather.snowfall.is_reported());
    }

    #[test]
    fn test_values_pass_through_unchanged() {
        let weather =
            normalize_weather(&request(json!({"precipitation": 250.0, "SNOW": "1.5"}))).unwrap();
        assert_eq!(weather.precipitation, Reading::Reported(250.0));
        assert_eq!(weather.snowfall, Reading::Reported(1.5));
    }

    #[test]
    fn test_nan_string_is_absent() {
        let weather = normalize_weather(&request(json!({"max_temp": "NaN"}))).unwrap();
        assert!(!weather.max_temp.is_known());
    }

    #[test]
    fn test_non_numeric_temperature_is_rejected() {
        let result = normalize_weather(&request(json!({"max_temp": "warm"})));
        assert!(matches!(result, Err(Error::InvalidNumeric { .. })));
    }
}
