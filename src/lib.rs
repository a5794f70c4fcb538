//! Incremental Argo profile → per-day CSV conversion.

pub mod bucket;
pub mod cli;
pub mod config;
pub mod depth;
pub mod error;
pub mod filter;
pub mod ledger;
pub mod pipeline;
pub mod record;
pub mod sink;
pub mod source;

pub use config::{Config, ReadErrorPolicy};
pub use depth::DepthMethod;
pub use error::{PipelineError, SinkError, SourceError};
pub use filter::{BoundingBox, RecencyWindow, RecordFilter};
pub use ledger::{FileLedger, Ledger, MemoryLedger};
pub use pipeline::{Pipeline, RunSummary};
pub use record::Record;
pub use sink::CsvDateSink;
pub use source::{NetcdfSource, ProfileArrays, ProfileSource};
