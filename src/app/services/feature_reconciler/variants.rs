//! Per-variant feature manifests and field rule tables
//!
//! Each model variant declares the ordered list of features it consumes and
//! one rule per feature: where the value comes from and the default used when
//! that source has nothing. Every default lives in these tables; nothing
//! downstream invents values of its own.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Reconciled quantity a feature can be taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    DayOfWeek,
    Hour,
    /// `(hour + 1) mod 24`
    NextHour,
    Month,
    Weekend,
    HourOfWeek,
    /// `hour_of_week + 1`
    NextHourOfWeek,
    IsNight,
    MaxTemp,
    MinTemp,
    Precipitation,
    Snowfall,
    AvgTemperature,
    TransitStops,
}

impl CanonicalField {
    /// Fields computed from other quantities rather than read from the request
    ///
    /// A request value under the feature's own name replaces these.
    pub fn is_computed(self) -> bool {
        matches!(
            self,
            CanonicalField::NextHour | CanonicalField::NextHourOfWeek | CanonicalField::IsNight
        )
    }
}

/// How a feature value is obtained
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "derive", rename_all = "snake_case")]
pub enum Derivation {
    /// Take a reconciled quantity
    Canonical { field: CanonicalField },
    /// Read the first raw request key that carries a number
    Raw { keys: Vec<String> },
}

/// Source and default for one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    #[serde(flatten)]
    pub derivation: Derivation,

    /// Used when the source has no value; without one the feature is missing
    #[serde(default)]
    pub default: Option<f64>,
}

impl FieldRule {
    pub fn canonical(field: CanonicalField) -> Self {
        Self {
            derivation: Derivation::Canonical { field },
            default: None,
        }
    }

    pub fn raw(keys: &[&str]) -> Self {
        Self {
            derivation: Derivation::Raw {
                keys: keys.iter().map(|k| k.to_string()).collect(),
            },
            default: None,
        }
    }

    pub fn with_default(mut self, default: f64) -> Self {
        self.default = Some(default);
        self
    }
}

/// Feature manifest and rule table of one model variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSpec {
    pub name: String,

    /// Feature names in the order the model consumes them
    pub manifest: Vec<String>,

    /// Rules by feature name; a feature without a rule reads the raw key of
    /// the same name and has no default
    #[serde(default)]
    pub rules: BTreeMap<String, FieldRule>,
}

impl VariantSpec {
    pub fn new(name: impl Into<String>, rules: Vec<(&str, FieldRule)>) -> Self {
        Self {
            name: name.into(),
            manifest: rules.iter().map(|(field, _)| field.to_string()).collect(),
            rules: rules
                .into_iter()
                .map(|(field, rule)| (field.to_string(), rule))
                .collect(),
        }
    }

    /// Rule for a manifest feature
    pub fn rule_for(&self, feature: &str) -> FieldRule {
        self.rules
            .get(feature)
            .cloned()
            .unwrap_or_else(|| FieldRule::raw(&[feature]))
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::configuration("Variant name cannot be empty"));
        }
        if self.manifest.is_empty() {
            return Err(Error::configuration(format!(
                "Variant '{}' has an empty feature manifest",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for feature in &self.manifest {
            if !seen.insert(feature.as_str()) {
                return Err(Error::configuration(format!(
                    "Variant '{}' lists feature '{}' twice",
                    self.name, feature
                )));
            }
        }

        for (feature, rule) in &self.rules {
            if !seen.contains(feature.as_str()) {
                return Err(Error::configuration(format!(
                    "Variant '{}' has a rule for '{}', which is not in its manifest",
                    self.name, feature
                )));
            }
            if matches!(&rule.derivation, Derivation::Raw { keys } if keys.is_empty()) {
                return Err(Error::configuration(format!(
                    "Variant '{}' rule for '{}' lists no raw keys",
                    self.name, feature
                )));
            }
        }

        Ok(())
    }
}

/// Zero-inflated count model over hour-of-day features
pub fn zinb() -> VariantSpec {
    use CanonicalField::*;
    VariantSpec::new(
        "zinb",
        vec![
            ("month", FieldRule::canonical(Month)),
            ("start_hour", FieldRule::canonical(Hour)),
            ("end_hour", FieldRule::canonical(NextHour)),
            (
                "subway_distance_m",
                FieldRule::raw(&["subway_distance_m", "dist_subway_m"]),
            ),
            (
                "mbta_stops_250m",
                FieldRule::canonical(TransitStops).with_default(1.0),
            ),
            ("last_day_in", FieldRule::raw(&["last_day_in"]).with_default(10.0)),
            ("last_day_out", FieldRule::raw(&["last_day_out"]).with_default(10.0)),
            ("is_night", FieldRule::canonical(IsNight)),
            (
                "precipitation",
                FieldRule::canonical(Precipitation).with_default(0.0),
            ),
            (
                "avg_temp",
                FieldRule::canonical(AvgTemperature).with_default(20.0),
            ),
        ],
    )
}

/// Count model over hour-of-week and daily weather
pub fn weekhour() -> VariantSpec {
    use CanonicalField::*;
    VariantSpec::new(
        "weekhour",
        vec![
            ("start_hour_of_week", FieldRule::canonical(HourOfWeek)),
            ("end_hour_of_week", FieldRule::canonical(NextHourOfWeek)),
            ("is_weekend", FieldRule::canonical(Weekend)),
            ("month", FieldRule::canonical(Month)),
            ("station_id", FieldRule::raw(&["station_id"]).with_default(325.0)),
            ("num_bikes_in", FieldRule::raw(&["num_bikes_in"]).with_default(0.0)),
            ("num_bikes_out", FieldRule::raw(&["num_bikes_out"]).with_default(0.0)),
            ("TMAX", FieldRule::canonical(MaxTemp)),
            ("TMIN", FieldRule::canonical(MinTemp)),
            ("PRCP", FieldRule::canonical(Precipitation).with_default(0.0)),
            ("SNOW", FieldRule::canonical(Snowfall)),
            ("dow", FieldRule::canonical(DayOfWeek)),
            ("hr", FieldRule::canonical(Hour)),
            ("weekend", FieldRule::canonical(Weekend)),
            ("weekhour", FieldRule::canonical(HourOfWeek)),
        ],
    )
}

/// Negative binomial model over station location and surroundings
pub fn nb() -> VariantSpec {
    use CanonicalField::*;
    VariantSpec::new(
        "nb",
        vec![
            ("hour_of_day", FieldRule::canonical(Hour)),
            ("day_of_week", FieldRule::canonical(DayOfWeek)),
            ("month", FieldRule::canonical(Month)),
            ("is_weekend", FieldRule::canonical(Weekend)),
            ("station_lat", FieldRule::raw(&["station_lat", "lat", "latitude"])),
            (
                "station_lng",
                FieldRule::raw(&["station_lng", "lng", "lon", "longitude"]),
            ),
            (
                "dist_subway_m",
                FieldRule::raw(&["dist_subway_m", "subway_distance_m"]),
            ),
            ("dist_bus_m", FieldRule::raw(&["dist_bus_m", "dist_to_transit"])),
            ("dist_university_m", FieldRule::raw(&["dist_university_m"])),
            ("dist_business", FieldRule::raw(&["dist_business"])),
            ("dist_residential", FieldRule::raw(&["dist_residential"])),
            ("restaurant_count", FieldRule::raw(&["restaurant_count"])),
        ],
    )
}

/// Available variants by name
#[derive(Debug, Clone)]
pub struct VariantRegistry {
    variants: BTreeMap<String, VariantSpec>,
}

impl VariantRegistry {
    /// Registry holding the built-in variants
    pub fn builtin() -> Self {
        let variants = [zinb(), weekhour(), nb()]
            .into_iter()
            .map(|spec| (spec.name.clone(), spec))
            .collect();
        Self { variants }
    }

    /// Built-ins plus configured variants; a configured variant replaces a
    /// built-in of the same name
    pub fn with_overrides(overrides: &[VariantSpec]) -> Result<Self> {
        let mut registry = Self::builtin();
        for spec in overrides {
            spec.validate()?;
            registry.variants.insert(spec.name.clone(), spec.clone());
        }
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Result<&VariantSpec> {
        self.variants
            .get(name.trim())
            .ok_or_else(|| Error::unknown_variant(name))
    }

    pub fn names(&self) -> Vec<&str> {
        self.variants.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_variants_are_valid() {
        let registry = VariantRegistry::builtin();
        assert_eq!(registry.names(), vec!["nb", "weekhour", "zinb"]);
        for name in registry.names() {
            registry.get(name).unwrap().validate().unwrap();
        }
    }

    #[test]
    fn test_manifest_order_is_declaration_order() {
        let spec = zinb();
        assert_eq!(spec.manifest[0], "month");
        assert_eq!(spec.manifest[2], "end_hour");
        assert_eq!(spec.manifest.last().map(String::as_str), Some("avg_temp"));
        assert_eq!(weekhour().manifest.len(), 15);
        assert_eq!(nb().manifest.len(), 12);
    }

    #[test]
    fn test_unknown_variant() {
        let err = VariantRegistry::builtin().get("xgboost").unwrap_err();
        assert!(matches!(err, Error::UnknownVariant { .. }));
    }

    #[test]
    fn test_rule_defaults_to_raw_key_of_same_name() {
        let spec = VariantSpec {
            name: "custom".to_string(),
            manifest: vec!["capacity".to_string()],
            rules: BTreeMap::new(),
        };
        assert_eq!(spec.rule_for("capacity"), FieldRule::raw(&["capacity"]));
    }

    #[test]
    fn test_validate_rejects_duplicates_and_stray_rules() {
        let mut spec = nb();
        spec.manifest.push("month".to_string());
        assert!(spec.validate().is_err());

        let mut spec = nb();
        spec.rules
            .insert("capacity".to_string(), FieldRule::raw(&["capacity"]));
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_override_from_toml() {
        let spec: VariantSpec = toml::from_str(
            r#"
            name = "zinb"
            manifest = ["start_hour", "capacity"]

            [rules.start_hour]
            derive = "canonical"
            field = "hour"

            [rules.capacity]
            derive = "raw"
            keys = ["capacity", "docks"]
            default = 19.0
            "#,
        )
        .unwrap();

        let registry = VariantRegistry::with_overrides(&[spec]).unwrap();
        let zinb = registry.get("zinb").unwrap();
        assert_eq!(zinb.manifest, vec!["start_hour", "capacity"]);
        assert_eq!(
            zinb.rule_for("capacity"),
            FieldRule::raw(&["capacity", "docks"]).with_default(19.0)
        );
        assert_eq!(registry.get("nb").unwrap().manifest.len(), 12);
    }
}
