//! Fingerprint store: SHA-256 change tracking for published documents.
//!
//! One `source_ref,hash` line per record, no header. The store is read fully
//! at startup, mutated in memory during the run, and rewritten fully by
//! [`ChangeTracker::flush`] using a `.tmp` + rename so a crash never leaves a
//! half-written file behind.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{io_err, SyncError};

/// SHA-256 hex digest of `content`, with CRLF normalised to LF first.
pub fn fingerprint(content: &str) -> String {
    let normalized = content.replace("\r\n", "\n");
    let mut h = Sha256::new();
    h.update(normalized.as_bytes());
    hex::encode(h.finalize())
}

/// In-memory view of the fingerprint store, keyed by source reference.
#[derive(Debug, Clone)]
pub struct ChangeTracker {
    path: PathBuf,
    records: BTreeMap<String, String>,
}

impl ChangeTracker {
    /// An empty tracker that will flush to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: BTreeMap::new(),
        }
    }

    /// Load the store at `path`.
    ///
    /// Returns an empty tracker if the file does not yet exist.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SyncError> {
        let path = path.into();
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::new(path)),
            Err(e) => return Err(io_err(&path, e)),
        };
        let records = parse_records(&path, &contents);
        tracing::debug!(path = %path.display(), records = records.len(), "loaded fingerprints");
        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stored hash for `source_ref`, if any.
    pub fn get(&self, source_ref: &str) -> Option<&str> {
        self.records.get(source_ref).map(String::as_str)
    }

    /// `true` if `content` differs from what was last recorded for `source_ref`.
    pub fn has_changed(&self, source_ref: &str, content: &str) -> bool {
        !matches!(self.records.get(source_ref), Some(stored) if *stored == fingerprint(content))
    }

    /// Remember `content` as the current version of `source_ref`.
    ///
    /// Memory only; nothing reaches disk until [`flush`](Self::flush).
    pub fn record(&mut self, source_ref: &str, content: &str) {
        self.records.insert(source_ref.to_owned(), fingerprint(content));
    }

    /// Replace the on-disk store with every in-memory record.
    ///
    /// Writes to `<path>.tmp`, syncs it, then renames to `<path>`. On
    /// failure the previous store is left untouched.
    pub fn flush(&self) -> std::io::Result<()> {
        self.flush_with_tmp(&tmp_path(&self.path))
    }

    fn flush_with_tmp(&self, tmp: &Path) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        let written = write_synced(tmp, render_records(&self.records).as_bytes())
            .and_then(|()| std::fs::rename(tmp, &self.path));
        if let Err(e) = written {
            let _ = std::fs::remove_file(tmp);
            return Err(e);
        }

        tracing::debug!(
            path = %self.path.display(),
            records = self.records.len(),
            "saved fingerprints"
        );
        Ok(())
    }
}

/// `<path>.tmp`, built on the raw OS string so non-UTF-8 names survive.
fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

fn write_synced(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

fn parse_records(path: &Path, contents: &str) -> BTreeMap<String, String> {
    let mut records = BTreeMap::new();
    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        // Source refs are URLs and may contain commas; hashes never do.
        match line.rsplit_once(',') {
            Some((source_ref, hash)) if !source_ref.is_empty() && !hash.is_empty() => {
                records.insert(source_ref.to_owned(), hash.to_owned());
            }
            _ => tracing::warn!(
                path = %path.display(),
                line = lineno + 1,
                "skipping malformed fingerprint record"
            ),
        }
    }
    records
}

fn render_records(records: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (source_ref, hash) in records {
        out.push_str(source_ref);
        out.push(',');
        out.push_str(hash);
        out.push('\n');
    }
    out
}
