//! One normalized measurement row built from a (profile, level) sample.

use chrono::NaiveDateTime;

use crate::depth::{depth, DepthMethod};

/// A single raw sample as it comes out of a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample<'a> {
    pub longitude:   f64,
    pub latitude:    f64,
    pub temperature: f64,
    pub pressure:    f64,
    pub salinity:    f64,
    pub timestamp:   NaiveDateTime,
    pub platform:    &'a str,
    pub cycle:       i32,
}

/// Normalized record. `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub platform_id:  String,
    pub cycle_number: i32,
    pub latitude:     f64,
    pub longitude:    f64,
    pub timestamp:    NaiveDateTime,
    pub depth:        Option<f64>,
    pub pressure:     Option<f64>,
    pub temperature:  Option<f64>,
    pub salinity:     Option<f64>,
}

impl Record {
    /// False when temperature, pressure and salinity are all missing.
    pub fn is_emittable(&self) -> bool {
        self.temperature.is_some() || self.pressure.is_some() || self.salinity.is_some()
    }
}

/// Map a longitude in [-180, 180) or [0, 360) onto [0, 360).
pub fn normalize_longitude(lon: f64) -> f64 {
    if lon < 0.0 { lon + 360.0 } else { lon }
}

/// Strip byte-string wrappers, quotes, NULs and padding from a platform id.
pub fn clean_platform_id(raw: &str) -> String {
    let mut s = raw.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    if let Some(rest) = s.strip_prefix('b') {
        if rest.starts_with(['\'', '"']) {
            s = rest;
        }
    }
    s.trim_matches(|c: char| c == '\'' || c == '"' || c == '\0' || c.is_whitespace())
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}

fn present(v: f64) -> Option<f64> {
    (!v.is_nan()).then_some(v)
}

pub fn build_record(sample: &RawSample<'_>, depth: Option<f64>) -> Record {
    Record {
        platform_id:  clean_platform_id(sample.platform),
        cycle_number: sample.cycle,
        latitude:     sample.latitude,
        longitude:    normalize_longitude(sample.longitude),
        timestamp:    sample.timestamp,
        depth:        depth.and_then(present),
        pressure:     present(sample.pressure),
        temperature:  present(sample.temperature),
        salinity:     present(sample.salinity),
    }
}

/// Solve depth for the sample and build its record in one step.
pub fn build_with_depth(sample: &RawSample<'_>, method: DepthMethod) -> Record {
    let z = depth(method, sample.pressure, sample.salinity, sample.temperature, sample.latitude);
    build_record(sample, z)
}
