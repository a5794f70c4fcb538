//! Persistent set of source files that have been fully ingested.
//!
//! Ordering contract: `mark_processed` is only called after every row for
//! the file has been flushed and synced. A crash between the two leaves the
//! file unmarked, so the next run re-ingests it and may append some rows a
//! second time. That is at-least-once delivery, not exactly-once.

use std::{
    collections::HashSet,
    fs::{self, File, OpenOptions},
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
};

pub trait Ledger {
    fn contains(&self, file_id: &str) -> bool;
    fn mark_processed(&mut self, file_id: &str) -> io::Result<()>;
}

// ─────────────────────────────────────────────────────────────────────
// Flat text file, one name per line, append-only
// ─────────────────────────────────────────────────────────────────────
#[derive(Debug)]
pub struct FileLedger {
    path: PathBuf,
    seen: HashSet<String>,
}

impl FileLedger {
    /// Load every entry into memory. A missing file is an empty ledger.
    /// Names are kept byte-for-byte apart from the line terminator.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let mut seen = HashSet::new();
        match File::open(&path) {
            Ok(f) => {
                for line in BufReader::new(f).lines() {
                    let line = line?;
                    let name = line.trim_end_matches(['\r', '\n']);
                    if !name.is_empty() { seen.insert(name.to_string()); }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        Ok(FileLedger { path, seen })
    }

    pub fn len(&self) -> usize { self.seen.len() }

    pub fn is_empty(&self) -> bool { self.seen.is_empty() }
}

impl Ledger for FileLedger {
    fn contains(&self, file_id: &str) -> bool {
        self.seen.contains(file_id)
    }

    fn mark_processed(&mut self, file_id: &str) -> io::Result<()> {
        if self.seen.contains(file_id) {
            return Ok(());
        }
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let mut f = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(f, "{file_id}")?;
        f.sync_all()?;
        self.seen.insert(file_id.to_string());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────
// In-memory fake
// ─────────────────────────────────────────────────────────────────────
#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    pub entries: Vec<String>,
}

impl Ledger for MemoryLedger {
    fn contains(&self, file_id: &str) -> bool {
        self.entries.iter().any(|e| e == file_id)
    }

    fn mark_processed(&mut self, file_id: &str) -> io::Result<()> {
        if !self.contains(file_id) {
            self.entries.push(file_id.to_string());
        }
        Ok(())
    }
}
