//! # mdpress-sync
//!
//! Change-tracked Markdown → WordPress publishing.
//!
//! Call [`pipeline::run`] to sync a configured manifest end to end, or build
//! a [`Pipeline`] around your own [`DocumentSource`] and [`PageApi`].

pub mod error;
pub mod fetch;
pub mod fingerprint;
pub mod pipeline;
pub mod publisher;
pub mod wordpress;

pub use error::{FetchError, PublishError, SyncError};
pub use fetch::{DocumentSource, Fetcher};
pub use fingerprint::ChangeTracker;
pub use pipeline::{EntryOutcome, EntryStatus, FailureStage, Pipeline, RunReport, SyncOptions};
pub use publisher::{PageApi, PageDraft, PageRequest, PublishAction, Published, Publisher};
pub use wordpress::WordPressClient;
