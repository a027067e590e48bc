//! Domain types shared across the mdpress crates.
//!
//! Remote wire formats live with their clients; everything here is the
//! decoded, transport-agnostic view.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// The human-readable identifier of a page, used as URL segment and lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Slug(pub String);

impl Slug {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when the slug is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Slug {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Slug {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identifier assigned to a page by the remote site. `0` means "no page".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct PageId(pub u64);

impl PageId {
    /// The sentinel used for "no parent".
    pub const NONE: PageId = PageId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for PageId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Publication status of a remote page.
///
/// Only [`PageStatus::Publish`] is ever written; the other variants exist so
/// pages found on the site decode without loss.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum PageStatus {
    #[default]
    Publish,
    Draft,
    Pending,
    Private,
    Future,
    Trash,
    Other(String),
}

impl PageStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PageStatus::Publish => "publish",
            PageStatus::Draft => "draft",
            PageStatus::Pending => "pending",
            PageStatus::Private => "private",
            PageStatus::Future => "future",
            PageStatus::Trash => "trash",
            PageStatus::Other(s) => s,
        }
    }
}

impl From<String> for PageStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "publish" => PageStatus::Publish,
            "draft" => PageStatus::Draft,
            "pending" => PageStatus::Pending,
            "private" => PageStatus::Private,
            "future" => PageStatus::Future,
            "trash" => PageStatus::Trash,
            _ => PageStatus::Other(s),
        }
    }
}

impl From<PageStatus> for String {
    fn from(status: PageStatus) -> Self {
        status.as_str().to_owned()
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One document to publish, as listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub slug: Slug,
    /// Where the Markdown is fetched from (URL or local path).
    pub source: String,
    pub parent: Option<Slug>,
    pub order: i64,
}

impl ManifestEntry {
    /// Reason this entry cannot be processed, if any.
    pub fn validate(&self) -> Result<(), String> {
        match (self.slug.is_blank(), self.source.trim().is_empty()) {
            (true, true) => Err("missing slug and markdown source".to_owned()),
            (true, false) => Err("missing slug".to_owned()),
            (false, true) => Err("missing markdown source".to_owned()),
            (false, false) => Ok(()),
        }
    }
}

/// A page as it exists on the remote site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePage {
    pub id: PageId,
    pub slug: Slug,
    pub parent: PageId,
    pub order: i64,
    pub title: String,
    pub html_body: String,
    pub status: PageStatus,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
