//! Geographic and recency predicate over records.

use chrono::{Duration, Months, NaiveDate};
use serde::Deserialize;

use crate::record::Record;

/// Exclusive bounding box in the canonical [0, 360) longitude convention.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BoundingBox {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        BoundingBox { lon_min: 0.0, lon_max: 360.0, lat_min: -90.0, lat_max: 90.0 }
    }
}

impl BoundingBox {
    /// Boundary-exact positions are rejected.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.lat_min < lat && lat < self.lat_max && self.lon_min < lon && lon < self.lon_max
    }
}

/// How far back from today records are kept.
///
/// `Months` uses calendar month subtraction and is kept for legacy
/// deployments only; prefer `Days`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecencyWindow {
    Days(u32),
    Months(u32),
}

impl Default for RecencyWindow {
    fn default() -> Self { RecencyWindow::Days(30) }
}

impl RecencyWindow {
    pub fn count(&self) -> u32 {
        match *self {
            RecencyWindow::Days(n) | RecencyWindow::Months(n) => n,
        }
    }
}

/// `today − window`. Month subtraction clamps to the end of shorter months.
pub fn cutoff_date(today: NaiveDate, window: RecencyWindow) -> NaiveDate {
    match window {
        RecencyWindow::Days(n) => today - Duration::days(i64::from(n)),
        RecencyWindow::Months(n) => today
            .checked_sub_months(Months::new(n))
            .unwrap_or(NaiveDate::MIN),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RecordFilter {
    pub bbox:   BoundingBox,
    pub cutoff: NaiveDate,
}

impl RecordFilter {
    pub fn new(bbox: BoundingBox, today: NaiveDate, window: RecencyWindow) -> Self {
        RecordFilter { bbox, cutoff: cutoff_date(today, window) }
    }

    pub fn accept(&self, record: &Record) -> bool {
        self.bbox.contains(record.latitude, record.longitude)
            && record.timestamp.date() > self.cutoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record_at(lat: f64, lon: f64, day: NaiveDate) -> Record {
        Record {
            platform_id:  "1".into(),
            cycle_number: 1,
            latitude:     lat,
            longitude:    lon,
            timestamp:    day.and_hms_opt(12, 0, 0).unwrap(),
            depth:        Some(10.0),
            pressure:     Some(10.0),
            temperature:  Some(10.0),
            salinity:     Some(35.0),
        }
    }

    fn filter() -> RecordFilter {
        let bbox = BoundingBox { lon_min: 10.0, lon_max: 20.0, lat_min: -5.0, lat_max: 5.0 };
        RecordFilter::new(bbox, date(2025, 3, 31), RecencyWindow::Days(10))
    }

    #[test]
    fn bounds_are_exclusive() {
        let f = filter();
        let d = date(2025, 3, 30);
        assert!(f.accept(&record_at(0.0, 15.0, d)));
        assert!(!f.accept(&record_at(-5.0, 15.0, d)));
        assert!(!f.accept(&record_at(5.0, 15.0, d)));
        assert!(!f.accept(&record_at(0.0, 10.0, d)));
        assert!(!f.accept(&record_at(0.0, 20.0, d)));
    }

    #[test]
    fn nan_position_is_rejected() {
        let f = filter();
        assert!(!f.accept(&record_at(f64::NAN, 15.0, date(2025, 3, 30))));
    }

    #[test]
    fn cutoff_day_itself_is_rejected() {
        let f = filter();
        assert_eq!(f.cutoff, date(2025, 3, 21));
        assert!(!f.accept(&record_at(0.0, 15.0, date(2025, 3, 21))));
        assert!(f.accept(&record_at(0.0, 15.0, date(2025, 3, 22))));
    }

    #[test]
    fn month_window_clamps_to_month_end() {
        assert_eq!(cutoff_date(date(2025, 3, 31), RecencyWindow::Months(1)), date(2025, 2, 28));
        assert_eq!(cutoff_date(date(2025, 5, 15), RecencyWindow::Months(2)), date(2025, 3, 15));
    }
}
