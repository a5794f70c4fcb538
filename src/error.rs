use std::{io, path::PathBuf};

use thiserror::Error;

/// Failure to get usable arrays out of one source file.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot open {path}: {reason}")]
    Open { path: PathBuf, reason: String },
    #[error("required variable '{0}' is missing")]
    MissingVariable(&'static str),
    #[error("variable '{name}' has {actual} values, expected {expected}")]
    Shape { name: &'static str, expected: usize, actual: usize },
    #[error("netcdf: {0}")]
    Netcdf(String),
}

impl From<netcdf::Error> for SourceError {
    fn from(e: netcdf::Error) -> Self {
        SourceError::Netcdf(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("reading {file}: {source}")]
    Read { file: String, #[source] source: SourceError },
    #[error("writing output for {file}: {source}")]
    Sink { file: String, #[source] source: SinkError },
    #[error("ledger: {0}")]
    Ledger(#[from] io::Error),
    #[error("discovering input files: {0}")]
    Discover(String),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
