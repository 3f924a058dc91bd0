//! Alias-aware access to partially populated requests
//!
//! A request is an open JSON object. Each recognised quantity is looked up by
//! its list of accepted keys, canonical name first; the first key carrying a
//! value wins. Null, NaN and empty-string values count as absent.

use crate::app::models::RowIssue;
use crate::constants::MAX_INTEGER_FIELD;
use crate::{Error, Result};
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Timestamp layouts accepted besides RFC 3339
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Prediction request as received from a caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRequest {
    fields: Map<String, Value>,
}

fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
        }
        _ => false,
    }
}

impl RawRequest {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Wrap a JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(Error::configuration(format!(
                "Request must be a JSON object, got {}",
                other
            ))),
        }
    }

    /// Set a field, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    /// Raw value of the first accepted key that carries one, with that key
    pub fn lookup(&self, keys: &[&str]) -> Option<(&str, &Value)> {
        keys.iter().find_map(|key| {
            self.fields
                .get_key_value(*key)
                .filter(|(_, value)| !is_absent(value))
                .map(|(key, value)| (key.as_str(), value))
        })
    }

    pub fn contains(&self, keys: &[&str]) -> bool {
        self.lookup(keys).is_some()
    }

    /// Numeric value of a quantity
    ///
    /// Numeric strings and booleans are accepted; any other string is an
    /// `InvalidNumeric` error rather than a silent absence.
    pub fn number(&self, keys: &[&str]) -> Result<Option<f64>> {
        let Some((key, value)) = self.lookup(keys) else {
            return Ok(None);
        };

        match value {
            Value::Number(n) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| Error::invalid_numeric(key, n.to_string())),
            Value::Bool(flag) => Ok(Some(if *flag { 1.0 } else { 0.0 })),
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(n) if n.is_nan() => Ok(None),
                Ok(n) if n.is_finite() => Ok(Some(n)),
                _ => Err(Error::invalid_numeric(key, s.as_str())),
            },
            other => Err(Error::invalid_numeric(key, other.to_string())),
        }
    }

    /// Integer value of a quantity; fractional parts are truncated
    ///
    /// Magnitudes above [`MAX_INTEGER_FIELD`] are `InvalidNumeric`, so
    /// arithmetic on the result cannot overflow.
    pub fn integer(&self, keys: &[&str]) -> Result<Option<i64>> {
        match self.number(keys)? {
            Some(n) if n.abs() > MAX_INTEGER_FIELD => {
                let key = self.lookup(keys).map_or("integer", |(key, _)| key);
                Err(Error::invalid_numeric(key, n.to_string()))
            }
            Some(n) => Ok(Some(n.trunc() as i64)),
            None => Ok(None),
        }
    }

    /// Flag value of a quantity; any non-zero number is true
    pub fn flag(&self, keys: &[&str]) -> Result<Option<bool>> {
        if let Some((key, Value::String(s))) = self.lookup(keys) {
            match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" => return Ok(Some(true)),
                "false" | "no" => return Ok(Some(false)),
                _ => {
                    return self
                        .number(&[key])
                        .map(|n| n.map(|value| value != 0.0));
                }
            }
        }
        Ok(self.number(keys)?.map(|n| n != 0.0))
    }

    /// Timestamp value of a quantity, as local wall-clock time
    pub fn timestamp(&self, keys: &[&str]) -> Result<Option<NaiveDateTime>> {
        let Some((key, value)) = self.lookup(keys) else {
            return Ok(None);
        };
        let Value::String(text) = value else {
            return Err(Error::invalid_numeric(key, value.to_string()));
        };
        let text = text.trim();

        if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
            return Ok(Some(parsed.naive_local()));
        }
        TIMESTAMP_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .map(Some)
            .ok_or_else(|| Error::invalid_numeric(key, text))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for RawRequest {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// One element of a request file: the request, or why it was unusable
pub type RequestEntry = std::result::Result<RawRequest, RowIssue>;

/// Parse request input: a single JSON object or an array of objects
///
/// Only unreadable JSON or a top-level value that is neither an object nor
/// an array fails the whole input. A non-object array element becomes a
/// [`RowIssue`] at its position and the other elements are kept.
pub fn parse_requests(input: &str) -> Result<Vec<RequestEntry>> {
    let value: Value =
        serde_json::from_str(input).map_err(|e| Error::json("Invalid request JSON", e))?;
    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .map(|(row, item)| {
                RawRequest::from_value(item).map_err(|e| RowIssue::from_error(row, &e))
            })
            .collect()),
        other => Ok(vec![Ok(RawRequest::from_value(other)?)]),
    }
}
