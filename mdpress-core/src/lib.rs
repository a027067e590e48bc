//! mdpress core library: domain types, configuration, manifest decoding, errors.
//!
//! - [`types`]: newtypes and domain structs
//! - [`config`]: config file loading and default paths
//! - [`manifest`]: manifest document decoding
//! - [`error`]: [`ConfigError`], [`ManifestError`]

pub mod config;
pub mod error;
pub mod manifest;
pub mod types;

pub use config::Config;
pub use error::{ConfigError, ManifestError};
pub use manifest::Manifest;
pub use types::{ManifestEntry, PageId, PageStatus, RemotePage, Slug};
