//! Application constants for the station reconciler
//!
//! This module contains thresholds, default values, column names and field
//! aliases used throughout the matching and reconciliation pipelines.

// =============================================================================
// Catalog Matching
// =============================================================================

/// Geo fallback acceptance threshold in decimal degrees (about 111 m at city scale)
///
/// A fallback candidate is accepted only when its distance is strictly below
/// this value.
pub const DEFAULT_GEO_THRESHOLD_DEGREES: f64 = 0.001;

/// Smallest accepted geo threshold in decimal degrees
pub const MIN_GEO_THRESHOLD_DEGREES: f64 = 1e-9;

/// Spatial grid cell size as a multiple of the fallback threshold
///
/// With cells twice the threshold, every point closer than the threshold lies
/// in the query cell or one of its eight neighbours, with margin to spare for
/// floating point rounding at cell edges.
pub const GRID_CELL_FACTOR: f64 = 2.0;

// =============================================================================
// Temporal Features
// =============================================================================

pub const HOURS_PER_DAY: i64 = 24;
pub const DAYS_PER_WEEK: i64 = 7;
pub const HOURS_PER_WEEK: i64 = HOURS_PER_DAY * DAYS_PER_WEEK;

/// Largest magnitude accepted for an integer request field
pub const MAX_INTEGER_FIELD: f64 = 1_000_000_000.0;

/// Month used when a request carries no month and no timestamp
pub const DEFAULT_MONTH: i64 = 6;

/// Hour-of-week used when neither it nor a day/hour pair is supplied
pub const DEFAULT_HOUR_OF_WEEK: i64 = 0;

/// Weekend day indices under the Sunday=0 convention (Sunday, Saturday)
pub const WEEKEND_DAYS: &[i64] = &[0, 6];

/// Hours of the day flagged as night
pub const NIGHT_HOURS: &[i64] = &[22, 23, 0, 1, 2, 3, 4];

// =============================================================================
// Derived Features
// =============================================================================

/// Distance-to-transit buckets (metres, exclusive upper bound) and the stop
/// count each bucket stands in for. Anything farther estimates zero stops.
pub const TRANSIT_STOP_BUCKETS: &[(f64, u32)] = &[(50.0, 3), (100.0, 2), (200.0, 1)];

// =============================================================================
// Prediction Output
// =============================================================================

/// Upper clip applied to raw model counts before rounding
pub const MAX_PREDICTED_COUNT: f64 = 100.0;

/// Variant used when neither config nor CLI selects one
pub const DEFAULT_VARIANT: &str = "zinb";

// =============================================================================
// Configuration Locations
// =============================================================================

pub const CONFIG_DIR_NAME: &str = "station-reconciler";
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const ENV_THRESHOLD: &str = "STATION_RECONCILER_THRESHOLD";
pub const ENV_VARIANT: &str = "STATION_RECONCILER_VARIANT";
pub const ENV_MODEL: &str = "STATION_RECONCILER_MODEL";

// =============================================================================
// Catalog Columns
// =============================================================================

/// Default column names for the reference catalog (first present alias wins)
pub mod reference_columns {
    pub const NAME: &[&str] = &["station_name", "name"];
    pub const LATITUDE: &[&str] = &["lat", "latitude"];
    pub const LONGITUDE: &[&str] = &["lng", "lon", "longitude"];
    pub const ATTRACTION_COUNT: &[&str] = &["num_attractions_r500", "attraction_count"];
    pub const DIST_TO_BIKELANE: &[&str] = &["dist_to_bikelane"];
    pub const DIST_TO_PARK: &[&str] = &["dist_to_park"];
}

/// Default column names for the query catalog
pub mod query_columns {
    pub const NAME: &str = "Station_name";
    pub const LATITUDE: &str = "Station latitude";
    pub const LONGITUDE: &str = "Station longitude";
}

/// Default name-addressed enrichment columns written to the query catalog
pub mod output_columns {
    pub const ATTRACTION_COUNT: &str = "Number of tourist attractions nearby";
    pub const DIST_TO_BIKELANE: &str = "Proximity to bike lanes";
    pub const DIST_TO_PARK: &str = "Proximity to parks";
    pub const MATCH_METHOD: &str = "match_method";
    pub const MATCHED_STATION: &str = "matched_station";
}

// =============================================================================
// Request Fields
// =============================================================================

/// Canonical request field names and the raw keys accepted for each.
///
/// Lookup order is the slice order: canonical name first, then aliases.
pub mod fields {
    pub const DAY_OF_WEEK: &[&str] = &["day_of_week", "dow"];
    pub const HOUR: &[&str] = &["hour", "hr", "hour_of_day", "start_hour"];
    pub const MONTH: &[&str] = &["month"];
    pub const WEEKEND: &[&str] = &["weekend", "is_weekend", "isWeekend"];
    pub const HOUR_OF_WEEK: &[&str] = &["hour_of_week", "weekhour", "start_hour_of_week"];
    pub const TIMESTAMP: &[&str] = &["timestamp", "hour_start"];

    pub const MAX_TEMP: &[&str] = &["max_temp", "TMAX"];
    pub const MIN_TEMP: &[&str] = &["min_temp", "TMIN"];
    pub const PRECIPITATION: &[&str] = &["precipitation", "PRCP"];
    pub const SNOWFALL: &[&str] = &["snowfall", "SNOW"];

    /// Generic rainfall reading that stands in for precipitation
    pub const RAINFALL: &[&str] = &["rainfall"];
    pub const AVG_TEMPERATURE: &[&str] = &["avg_temperature", "avg_temp"];
    /// Generic temperature reading that stands in for the average
    pub const TEMPERATURE: &[&str] = &["temperature"];

    /// Directly measured transit stop count near the station
    pub const TRANSIT_STOP_COUNT: &[&str] = &["transit_stop_count", "mbta_stops_250m"];
    /// Raw distance to the nearest transit stop, used for the stop estimate
    pub const DIST_TO_TRANSIT: &[&str] = &["dist_to_transit", "dist_bus_m"];
}
