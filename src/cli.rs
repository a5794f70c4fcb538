use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::{
    config::{Config, ReadErrorPolicy},
    depth::DepthMethod,
    filter::RecencyWindow,
};

/// Select Argo profiles by region and recency and append them to per-day CSV files.
#[derive(Debug, Parser)]
#[command(name = "argo_to_csv", version, about)]
pub struct Args {
    /// Directory holding the source profile files
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory receiving `<YYYY-MM-DD>.csv` files
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// TOML configuration file; flags below override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Ledger of already ingested files [default: <output>_processed_files.txt]
    #[arg(long)]
    pub ledger: Option<PathBuf>,

    #[arg(long, allow_hyphen_values = true)]
    pub lon_min: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub lon_max: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub lat_min: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub lat_max: Option<f64>,

    /// Keep casts newer than this many days
    #[arg(long, conflicts_with = "months")]
    pub days: Option<u32>,

    /// Keep casts newer than this many calendar months (legacy)
    #[arg(long)]
    pub months: Option<u32>,

    /// direct | iterative
    #[arg(long)]
    pub depth_method: Option<DepthMethod>,

    /// skip | abort
    #[arg(long)]
    pub on_read_error: Option<ReadErrorPolicy>,

    /// Files parsed in parallel per batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Glob matched inside the input directory
    #[arg(long)]
    pub pattern: Option<String>,

    /// Read and filter without writing output or touching the ledger
    #[arg(long)]
    pub dry_run: bool,

    /// -v for debug, -vv for trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    pub fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (_, 0)    => "info",
            (_, 1)    => "debug",
            _         => "trace",
        }
    }

    /// Start from the config file (or defaults) and apply every flag given.
    pub fn to_config(&self) -> Result<Config> {
        let mut c = match &self.config {
            Some(path) => Config::load(path)?,
            None       => Config::default(),
        };
        if let Some(v) = &self.input   { c.input_dir    = v.clone(); }
        if let Some(v) = &self.output  { c.output_dir   = v.clone(); }
        if let Some(v) = &self.ledger  { c.ledger_path  = Some(v.clone()); }
        if let Some(v) = self.lon_min  { c.bbox.lon_min = v; }
        if let Some(v) = self.lon_max  { c.bbox.lon_max = v; }
        if let Some(v) = self.lat_min  { c.bbox.lat_min = v; }
        if let Some(v) = self.lat_max  { c.bbox.lat_max = v; }
        if let Some(n) = self.days     { c.recency      = RecencyWindow::Days(n); }
        if let Some(n) = self.months   { c.recency      = RecencyWindow::Months(n); }
        if let Some(m) = self.depth_method  { c.depth_method  = m; }
        if let Some(p) = self.on_read_error { c.on_read_error = p; }
        if let Some(n) = self.batch_size    { c.batch_size    = n; }
        if let Some(p) = &self.pattern      { c.file_pattern  = p.clone(); }
        c.validate()?;
        Ok(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let a = Args::parse_from([
            "argo_to_csv", "-i", "in", "-o", "out", "--lat-min", "-10", "--lat-max", "10",
            "--months", "2", "--depth-method", "iterative",
        ]);
        let c = a.to_config().unwrap();
        assert_eq!(c.input_dir, PathBuf::from("in"));
        assert_eq!(c.bbox.lat_min, -10.0);
        assert_eq!(c.recency, RecencyWindow::Months(2));
        assert_eq!(c.depth_method, DepthMethod::Iterative);
        assert_eq!(a.log_level(), "info");
    }

    #[test]
    fn days_and_months_conflict() {
        assert!(Args::try_parse_from(["argo_to_csv", "--days", "3", "--months", "1"]).is_err());
    }
}
