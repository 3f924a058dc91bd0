//! Shared test utilities and fixtures for catalog index tests

use crate::app::models::ReferenceStationRecord;
use std::fs;
use std::path::{Path, PathBuf};

pub mod parser_tests;

/// Create a reference record with fixed enrichment values
pub fn create_reference_record(name: &str, lat: f64, lng: f64) -> ReferenceStationRecord {
    ReferenceStationRecord::new(name, lat, lng, 3, 25.0, 140.0).unwrap()
}

/// Small reference catalog with a duplicated name in two spellings
pub fn sample_reference_records() -> Vec<ReferenceStationRecord> {
    vec![
        create_reference_record("Central Square", 42.365, -71.103),
        create_reference_record("Kendall/MIT", 42.3625, -71.0862),
        create_reference_record("  central square ", 42.370, -71.105),
        create_reference_record("Harvard Square", 42.3734, -71.1189),
    ]
}

pub const REFERENCE_CSV: &str = "\
station_name,lat,lng,num_attractions_r500,dist_to_bikelane,dist_to_park
Central Square,42.365,-71.103,4,12.5,80.0
Kendall/MIT,42.3625,-71.0862,7.0,3.0,210.5
Broken Row,not-a-number,-71.1,1,1.0,1.0
,42.36,-71.09,1,1.0,1.0
Harvard Square,42.3734,-71.1189,9,0.0,55.0
";

pub const QUERY_CSV: &str = "\
Station_name,Station latitude,Station longitude,Capacity
Central Square,42.3651,-71.1031,19
Mystery Dock,,-71.2,11
Unknown St,42.3601,-71.0801,15
";

/// Write CSV text into a directory and return the file path
pub fn write_csv(dir: &Path, filename: &str, content: &str) -> std::io::Result<PathBuf> {
    let path = dir.join(filename);
    fs::write(&path, content)?;
    Ok(path)
}
