//! DISCOVER → FILTER_BY_LEDGER → per file { READ → BUILD → FILTER → BUCKET → WRITE → MARK }
//!
//! Files are prepared (read/build/filter/bucket) in parallel batches, then
//! written and marked one at a time on the calling thread, so both the
//! ledger and every date file only ever have a single writer.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use glob::glob;
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::{
    bucket::{bucket_by_date, DateBuckets},
    config::{Config, ReadErrorPolicy},
    depth::DepthMethod,
    error::{PipelineError, SourceError},
    filter::RecordFilter,
    ledger::Ledger,
    record::build_with_depth,
    sink::CsvDateSink,
    source::ProfileSource,
};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    pub discovered:        usize,
    pub already_processed: usize,
    pub processed:         usize,
    pub failed:            Vec<(String, String)>,
    pub undated_profiles:  usize,
    pub records_built:     usize,
    pub records_accepted:  usize,
    pub rows_written:      usize,
    pub dates:             BTreeSet<NaiveDate>,
}

/// Everything derived from one source file, ready to be written.
#[derive(Debug)]
pub struct FileOutput {
    pub id:       String,
    pub buckets:  DateBuckets,
    pub built:    usize,
    pub accepted: usize,
    pub undated:  usize,
}

/// Sorted list of files in `dir` matching `pattern`.
pub fn discover(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, PipelineError> {
    if !dir.is_dir() {
        return Err(PipelineError::Discover(format!("{} is not a directory", dir.display())));
    }
    let pat = dir.join(pattern);
    let mut v: Vec<_> = glob(&pat.to_string_lossy())
        .map_err(|e| PipelineError::Discover(e.to_string()))?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();
    v.sort();
    Ok(v)
}

/// Ledger key for a source file: its file name.
pub fn file_id(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// READ → BUILD → FILTER → BUCKET for a single file. No side effects.
pub fn prepare_file<S: ProfileSource + ?Sized>(
    source: &S,
    path:   &Path,
    filter: &RecordFilter,
    method: DepthMethod,
) -> Result<FileOutput, SourceError> {
    let arrays = source.read(path)?;
    arrays.validate()?;

    let mut built = 0;
    let accepted: Vec<_> = arrays
        .samples()
        .map(|s| {
            built += 1;
            build_with_depth(&s, method)
        })
        .filter(|r| r.is_emittable() && filter.accept(r))
        .collect();

    Ok(FileOutput {
        id: file_id(path),
        accepted: accepted.len(),
        buckets: bucket_by_date(accepted),
        built,
        undated: arrays.undated_profiles(),
    })
}

pub struct Pipeline<'a, S: ProfileSource, L: Ledger> {
    source:     &'a S,
    ledger:     &'a mut L,
    sink:       CsvDateSink,
    filter:     RecordFilter,
    method:     DepthMethod,
    policy:     ReadErrorPolicy,
    batch_size: usize,
    dry_run:    bool,
}

impl<'a, S: ProfileSource, L: Ledger> Pipeline<'a, S, L> {
    pub fn new(config: &Config, source: &'a S, ledger: &'a mut L, today: NaiveDate) -> Self {
        Pipeline {
            source,
            ledger,
            sink:       CsvDateSink::new(&config.output_dir),
            filter:     RecordFilter::new(config.bbox, today, config.recency),
            method:     config.depth_method,
            policy:     config.on_read_error,
            batch_size: config.batch_size.max(1),
            dry_run:    false,
        }
    }

    /// Read and filter but never touch the output directory or the ledger.
    pub fn dry_run(mut self, yes: bool) -> Self {
        self.dry_run = yes;
        self
    }

    pub fn run_dir(&mut self, dir: &Path, pattern: &str) -> Result<RunSummary, PipelineError> {
        let files = discover(dir, pattern)?;
        self.run(&files)
    }

    pub fn run(&mut self, files: &[PathBuf]) -> Result<RunSummary, PipelineError> {
        let mut summary = RunSummary { discovered: files.len(), ..Default::default() };

        let pending: Vec<(String, &PathBuf)> = files
            .iter()
            .map(|p| (file_id(p), p))
            .filter(|(id, _)| !self.ledger.contains(id))
            .collect();
        summary.already_processed = files.len() - pending.len();
        if summary.already_processed > 0 {
            debug!("{} file(s) already in ledger", summary.already_processed);
        }

        let total_batches = pending.len().div_ceil(self.batch_size);
        for (batch_no, chunk) in pending.chunks(self.batch_size).enumerate() {
            debug!("batch {}/{} ({} file(s))", batch_no + 1, total_batches, chunk.len());

            // ----------- PREPARE this chunk in parallel ----------------------
            let (source, filter, method) = (self.source, self.filter, self.method);
            let prepared: Vec<(&String, Result<FileOutput, SourceError>)> = chunk
                .par_iter()
                .map(|(id, path)| {
                    info!("Processing {id}");
                    (id, prepare_file(source, path, &filter, method))
                })
                .collect();

            // ----------- WRITE + MARK sequentially, in discovery order -------
            for (id, result) in prepared {
                match result {
                    Ok(out) => self.commit(out, &mut summary)?,
                    Err(e) => match self.policy {
                        ReadErrorPolicy::Skip => {
                            warn!("skipping {id}: {e}");
                            summary.failed.push((id.clone(), e.to_string()));
                        }
                        ReadErrorPolicy::Abort => {
                            return Err(PipelineError::Read { file: id.clone(), source: e });
                        }
                    },
                }
            }
        }
        Ok(summary)
    }

    /// Land every bucket of one file, then mark it. Nothing is marked if any write fails.
    fn commit(&mut self, out: FileOutput, summary: &mut RunSummary) -> Result<(), PipelineError> {
        debug!(
            "{}: {} built, {} accepted, {} date(s), {} undated profile(s)",
            out.id, out.built, out.accepted, out.buckets.len(), out.undated
        );
        summary.records_built    += out.built;
        summary.records_accepted += out.accepted;
        summary.undated_profiles += out.undated;

        for (date, records) in &out.buckets {
            let n = if self.dry_run {
                records.iter().filter(|r| r.is_emittable()).count()
            } else {
                self.sink
                    .write(*date, records)
                    .map_err(|source| PipelineError::Sink { file: out.id.clone(), source })?
            };
            if n > 0 {
                summary.dates.insert(*date);
            }
            summary.rows_written += n;
        }

        if !self.dry_run {
            self.ledger.mark_processed(&out.id)?;
        }
        summary.processed += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_id_is_the_name() {
        assert_eq!(file_id(Path::new("/a/b/D20250317_prof_3.nc")), "D20250317_prof_3.nc");
    }

    #[test]
    fn discover_sorts_and_matches_pattern() {
        let dir = tempdir().unwrap();
        for name in ["b.nc", "a.nc", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.nc")).unwrap();
        let found = discover(dir.path(), "*.nc").unwrap();
        let names: Vec<_> = found.iter().map(|p| file_id(p)).collect();
        assert_eq!(names, vec!["a.nc", "b.nc"]);
    }

    #[test]
    fn discover_rejects_missing_dir() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            discover(&dir.path().join("nope"), "*.nc"),
            Err(PipelineError::Discover(_))
        ));
    }
}
