//! Manifest sync pipeline.
//!
//! Per entry, strictly in manifest order:
//!
//! 1. Validate slug and source.
//! 2. Fetch the Markdown.
//! 3. Compare its fingerprint → skip if unchanged.
//! 4. Convert to title + HTML.
//! 5. Publish (create or update by slug).
//! 6. Record the new fingerprint in memory.
//!
//! A failure at any step marks that entry failed and moves on. The
//! fingerprint store is flushed once, after the last entry, so a crash
//! mid-run costs at most some republishing on the next run.

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

use mdpress_core::{manifest, Config, Manifest, ManifestEntry, PageId, Slug};
use mdpress_renderer::Converter;

use crate::error::{FetchError, PublishError, SyncError};
use crate::fetch::{build_agent, DocumentSource, Fetcher};
use crate::fingerprint::ChangeTracker;
use crate::publisher::{PageApi, PageRequest, PublishAction, Publisher};
use crate::wordpress::WordPressClient;

// ---------------------------------------------------------------------------
// Options and outcomes
// ---------------------------------------------------------------------------

/// Run-wide switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Fetch, compare and convert, but write nothing remotely or to disk.
    pub dry_run: bool,
    /// Publish even when the fingerprint says the content is unchanged.
    pub force: bool,
}

/// Where an entry failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Validate,
    Fetch,
    Publish,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Validate => f.write_str("validate"),
            FailureStage::Fetch => f.write_str("fetch"),
            FailureStage::Publish => f.write_str("publish"),
        }
    }
}

/// Terminal state of one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryStatus {
    Created { id: PageId },
    Updated { id: PageId },
    /// Dry-run: the entry changed and would have been published.
    WouldPublish,
    Unchanged,
    Failed { stage: FailureStage, reason: String },
}

impl EntryStatus {
    pub fn is_published(&self) -> bool {
        matches!(self, EntryStatus::Created { .. } | EntryStatus::Updated { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, EntryStatus::Failed { .. })
    }
}

/// Outcome for one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryOutcome {
    pub slug: Slug,
    pub source: String,
    pub status: EntryStatus,
}

/// Summary of a full run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub outcomes: Vec<EntryOutcome>,
    /// Remote slug lookups issued (cache misses).
    pub lookups: usize,
    pub dry_run: bool,
}

impl RunReport {
    pub fn published(&self) -> usize {
        self.count(EntryStatus::is_published)
    }

    pub fn unchanged(&self) -> usize {
        self.count(|s| matches!(s, EntryStatus::Unchanged))
    }

    pub fn would_publish(&self) -> usize {
        self.count(|s| matches!(s, EntryStatus::WouldPublish))
    }

    pub fn failed(&self) -> usize {
        self.count(EntryStatus::is_failed)
    }

    fn count(&self, pred: impl Fn(&EntryStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    /// One-line summary, e.g. `3 entries: 1 published, 1 unchanged, 1 failed`.
    pub fn summary(&self) -> String {
        let changed = if self.dry_run {
            format!("{} would publish", self.would_publish())
        } else {
            format!("{} published", self.published())
        };
        format!(
            "{} entries: {}, {} unchanged, {} failed",
            self.outcomes.len(),
            changed,
            self.unchanged(),
            self.failed()
        )
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Drives one manifest through fetch → compare → convert → publish → record.
///
/// Owns the publisher (and its slug index) and the change tracker for the
/// duration of the run.
///
/// List parents before their children in the manifest: a child processed
/// before its parent exists is published unparented and, once fingerprinted,
/// is only re-parented when its content changes.
pub struct Pipeline<'a, S: DocumentSource + ?Sized, A: PageApi + ?Sized> {
    source: &'a S,
    publisher: Publisher<'a, A>,
    tracker: ChangeTracker,
    converter: Converter,
    collection: String,
    options: SyncOptions,
}

impl<'a, S: DocumentSource + ?Sized, A: PageApi + ?Sized> Pipeline<'a, S, A> {
    pub fn new(
        source: &'a S,
        api: &'a A,
        tracker: ChangeTracker,
        collection: impl Into<String>,
        options: SyncOptions,
    ) -> Self {
        Self {
            source,
            publisher: Publisher::new(api),
            tracker,
            converter: Converter::new(),
            collection: collection.into(),
            options,
        }
    }

    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    pub fn publisher(&self) -> &Publisher<'a, A> {
        &self.publisher
    }

    /// Process every entry, then flush fingerprints once (not in dry-run).
    pub fn run(&mut self, manifest: &Manifest) -> Result<RunReport, SyncError> {
        let started_at = Utc::now();
        let clock = Instant::now();
        let lookups_before = self.publisher.lookups();

        let mut outcomes = Vec::with_capacity(manifest.len());
        for entry in manifest {
            let status = self.process(entry);
            if let EntryStatus::Failed { stage, reason } = &status {
                tracing::warn!(slug = %entry.slug, %stage, "skipping entry: {reason}");
            }
            outcomes.push(EntryOutcome {
                slug: entry.slug.clone(),
                source: entry.source.clone(),
                status,
            });
        }

        let report = RunReport {
            started_at,
            elapsed: clock.elapsed(),
            outcomes,
            lookups: self.publisher.lookups() - lookups_before,
            dry_run: self.options.dry_run,
        };

        if !self.options.dry_run {
            self.tracker
                .flush()
                .map_err(|source| SyncError::Persistence {
                    path: self.tracker.path().to_path_buf(),
                    published: report.published(),
                    source,
                })?;
        }

        tracing::info!("{}", report.summary());
        Ok(report)
    }

    fn process(&mut self, entry: &ManifestEntry) -> EntryStatus {
        if let Err(reason) = entry.validate() {
            return failed(FailureStage::Validate, reason);
        }

        let content = match self.source.fetch(&entry.source) {
            Ok(content) => content,
            Err(err) => return fetch_failed(&err),
        };

        if !self.options.force && !self.tracker.has_changed(&entry.source, &content) {
            tracing::info!(slug = %entry.slug, "no changes");
            return EntryStatus::Unchanged;
        }

        let doc = self.converter.convert(&content);

        if self.options.dry_run {
            tracing::info!(slug = %entry.slug, title = %doc.title, "[dry-run] would publish");
            return EntryStatus::WouldPublish;
        }

        let request = PageRequest {
            slug: &entry.slug,
            title: &doc.title,
            html_body: &doc.html,
            parent: entry.parent.as_ref(),
            order: entry.order,
        };
        let published = match self.publisher.publish(&self.collection, request) {
            Ok(published) => published,
            Err(err) => return publish_failed(&err),
        };

        // Only a successful publish moves the fingerprint forward.
        self.tracker.record(&entry.source, &content);

        match published.action {
            PublishAction::Created => EntryStatus::Created {
                id: published.page.id,
            },
            PublishAction::Updated => EntryStatus::Updated {
                id: published.page.id,
            },
        }
    }
}

fn failed(stage: FailureStage, reason: impl Into<String>) -> EntryStatus {
    EntryStatus::Failed {
        stage,
        reason: reason.into(),
    }
}

fn fetch_failed(err: &FetchError) -> EntryStatus {
    failed(FailureStage::Fetch, err.to_string())
}

fn publish_failed(err: &PublishError) -> EntryStatus {
    failed(FailureStage::Publish, err.to_string())
}

// ---------------------------------------------------------------------------
// Entrypoint
// ---------------------------------------------------------------------------

/// Fetch and decode the manifest at `url`.
pub fn fetch_manifest<S: DocumentSource + ?Sized>(
    source: &S,
    url: &str,
) -> Result<Manifest, SyncError> {
    let contents = source
        .fetch(url)
        .map_err(|source| SyncError::ManifestFetch {
            url: url.to_owned(),
            source,
        })?;
    let manifest = manifest::parse(&contents).map_err(|source| SyncError::ManifestDecode {
        url: url.to_owned(),
        source,
    })?;
    tracing::info!(url, entries = manifest.len(), "loaded manifest");
    Ok(manifest)
}

/// Run a full sync with the HTTP fetcher and the WordPress client.
///
/// This is the canonical entrypoint used by `mdpress sync`.
pub fn run(
    config: &Config,
    fingerprint_path: &Path,
    options: SyncOptions,
) -> Result<RunReport, SyncError> {
    let agent = build_agent(config.timeout);
    let fetcher = Fetcher::new(agent.clone());
    let client = WordPressClient::from_config(agent, config);

    let tracker = ChangeTracker::load(fingerprint_path)?;
    let manifest = fetch_manifest(&fetcher, &config.source_url)?;

    Pipeline::new(
        &fetcher,
        &client,
        tracker,
        config.wordpress_type.clone(),
        options,
    )
    .run(&manifest)
}
