//! Per-date CSV output. Files come into existence already holding a BOM and
//! header and are only ever appended to afterwards.

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use csv::WriterBuilder;
use tempfile::NamedTempFile;

use crate::{error::SinkError, record::Record};

pub const HEADER: [&str; 9] = [
    "Platform_number", "Cycle_number", "Latitude", "Longitude", "Datetime",
    "Depth", "Pressure", "Temperature", "Salinity",
];
pub const MISSING_SENTINEL: &str  = "99999";
pub const DELIMITER:        u8    = b';';
pub const UTF8_BOM:         &[u8] = b"\xEF\xBB\xBF";
pub const DATETIME_FMT:     &str  = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct CsvDateSink {
    dir: PathBuf,
}

impl CsvDateSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CsvDateSink { dir: dir.into() }
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.csv", date.format("%Y-%m-%d")))
    }

    /// Append the emittable records for `date`, making sure the file starts
    /// with BOM + header first. Returns the number of rows written. The file
    /// is synced before returning.
    pub fn write(&self, date: NaiveDate, records: &[Record]) -> Result<usize, SinkError> {
        let rows: Vec<_> = records.iter().filter(|r| r.is_emittable()).map(format_row).collect();
        if rows.is_empty() {
            return Ok(0);
        }

        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(date);
        self.ensure_header(&path)?;

        let file = OpenOptions::new().append(true).open(&path)?;
        let mut w = WriterBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(false)
            .from_writer(file);
        for row in &rows {
            w.write_record(row)?;
        }

        let file = w.into_inner().map_err(|e| SinkError::Io(e.into_error()))?;
        file.sync_all()?;
        Ok(rows.len())
    }

    /// The header is staged in a temp file next to the target and moved into
    /// place with `persist_noclobber`, so a date file never exists without
    /// its header. A zero-length file left behind by older runs gets one too.
    fn ensure_header(&self, path: &Path) -> Result<(), SinkError> {
        match fs::metadata(path) {
            Ok(m) if m.len() > 0 => return Ok(()),
            Ok(_) => {
                let mut f = OpenOptions::new().append(true).open(path)?;
                f.write_all(&header_bytes()?)?;
                f.sync_all()?;
                return Ok(());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&header_bytes()?)?;
        tmp.as_file().sync_all()?;
        match tmp.persist_noclobber(path) {
            Ok(_) => Ok(()),
            // another writer claimed it first, with its own header
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e.error.into()),
        }
    }
}

fn header_bytes() -> Result<Vec<u8>, SinkError> {
    let mut w = WriterBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .from_writer(UTF8_BOM.to_vec());
    w.write_record(HEADER)?;
    w.into_inner().map_err(|e| SinkError::Io(e.into_error()))
}

fn fmt3(v: Option<f64>) -> String {
    v.map_or_else(|| MISSING_SENTINEL.to_string(), |x| format!("{x:.3}"))
}

pub fn format_row(r: &Record) -> [String; 9] {
    [
        r.platform_id.clone(),
        r.cycle_number.to_string(),
        format!("{:.3}", r.latitude),
        format!("{:.3}", r.longitude),
        r.timestamp.format(DATETIME_FMT).to_string(),
        fmt3(r.depth),
        fmt3(r.pressure),
        fmt3(r.temperature),
        fmt3(r.salinity),
    ]
}
