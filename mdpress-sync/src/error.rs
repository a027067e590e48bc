//! Error types for mdpress-sync.
//!
//! [`SyncError`] is fatal to a run. [`FetchError`] and [`PublishError`] are
//! scoped to a single manifest entry and never abort the batch.

use std::path::PathBuf;

use thiserror::Error;

use mdpress_core::{ManifestError, Slug};

/// Errors that abort a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The manifest could not be fetched.
    #[error("cannot fetch manifest from {url}: {source}")]
    ManifestFetch {
        url: String,
        #[source]
        source: FetchError,
    },

    /// The manifest was fetched but could not be decoded.
    #[error("cannot decode manifest from {url}: {source}")]
    ManifestDecode {
        url: String,
        #[source]
        source: ManifestError,
    },

    /// An I/O error, with annotated path for context (fingerprint store load).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The fingerprint store could not be written at the end of the run.
    /// Pages already published stay published.
    #[error("cannot save fingerprints to {path} ({published} page(s) already live): {source}")]
    Persistence {
        path: PathBuf,
        published: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// A document (or the manifest) could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Connection, DNS, TLS, timeout, or body read failure.
    #[error("GET {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// A local source file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A create, update or lookup call against the remote site failed.
///
/// `endpoint` is `"<METHOD> <url>"`.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("{endpoint} for '{slug}' returned HTTP {status}: {body}")]
    Status {
        slug: Slug,
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("{endpoint} for '{slug}' failed: {reason}")]
    Transport {
        slug: Slug,
        endpoint: String,
        reason: String,
    },

    #[error("{endpoint} for '{slug}' returned a malformed body: {source}")]
    Decode {
        slug: Slug,
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PublishError {
    /// The slug the failing request was made for.
    pub fn slug(&self) -> &Slug {
        match self {
            PublishError::Status { slug, .. }
            | PublishError::Transport { slug, .. }
            | PublishError::Decode { slug, .. } => slug,
        }
    }
}
