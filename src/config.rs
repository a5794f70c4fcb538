//! Run configuration, loadable from TOML and overridable from the CLI.
//!
//! ```toml
//! input_dir     = "/data/argo/incoming"
//! output_dir    = "/data/argo/csv"
//! depth_method  = "iterative"
//! on_read_error = "skip"
//! recency       = { days = 30 }
//! bbox          = { lon_min = 300.0, lon_max = 340.0, lat_min = 40.0, lat_max = 60.0 }
//! ```

use std::{fs, path::{Path, PathBuf}};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::{
    depth::DepthMethod,
    filter::{BoundingBox, RecencyWindow},
};

pub const DEFAULT_LEDGER_NAME: &str   = "processed_files.txt";
pub const DEFAULT_PATTERN:     &str   = "*.nc";
pub const DEFAULT_BATCH:       usize  = 8;

/// What to do with a source file that cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadErrorPolicy {
    /// Warn, leave the file out of the ledger, carry on with the next one.
    #[default]
    Skip,
    /// Stop the run at the first unreadable file.
    Abort,
}

impl std::str::FromStr for ReadErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip"  => Ok(ReadErrorPolicy::Skip),
            "abort" => Ok(ReadErrorPolicy::Abort),
            other   => Err(format!("unknown read error policy '{other}' (expected skip|abort)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub input_dir:     PathBuf,
    pub output_dir:    PathBuf,
    pub ledger_path:   Option<PathBuf>,
    pub bbox:          BoundingBox,
    pub recency:       RecencyWindow,
    pub depth_method:  DepthMethod,
    pub on_read_error: ReadErrorPolicy,
    pub batch_size:    usize,
    pub file_pattern:  String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input_dir:     PathBuf::from("."),
            output_dir:    PathBuf::from("output"),
            ledger_path:   None,
            bbox:          BoundingBox::default(),
            recency:       RecencyWindow::default(),
            depth_method:  DepthMethod::default(),
            on_read_error: ReadErrorPolicy::default(),
            batch_size:    DEFAULT_BATCH,
            file_pattern:  DEFAULT_PATTERN.to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&text)
    }

    /// Ledger location. Defaults to `<output>_processed_files.txt` beside the
    /// output directory so that directory holds nothing but date files.
    pub fn ledger_path(&self) -> PathBuf {
        if let Some(p) = &self.ledger_path {
            return p.clone();
        }
        let name = match self.output_dir.file_name() {
            Some(n) => format!("{}_{DEFAULT_LEDGER_NAME}", n.to_string_lossy()),
            None    => DEFAULT_LEDGER_NAME.to_string(),
        };
        self.output_dir.parent().unwrap_or_else(|| Path::new("")).join(name)
    }

    pub fn validate(&self) -> Result<()> {
        let b = &self.bbox;
        if !(b.lat_min < b.lat_max) {
            bail!("lat_min ({}) must be below lat_max ({})", b.lat_min, b.lat_max);
        }
        if !(b.lon_min < b.lon_max) {
            bail!("lon_min ({}) must be below lon_max ({})", b.lon_min, b.lon_max);
        }
        if b.lon_min < 0.0 || b.lon_max > 360.0 {
            bail!("longitude bounds must use the 0..360 convention, got {}..{}", b.lon_min, b.lon_max);
        }
        if self.recency.count() == 0 {
            bail!("recency window must be at least 1");
        }
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        if self.file_pattern.is_empty() {
            bail!("file_pattern must not be empty");
        }
        Ok(())
    }
}
