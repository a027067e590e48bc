//! Error types for mdpress-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading the configuration file. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML/JSON parse error, with path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// One or more required keys are absent or blank.
    #[error("config at {path} is missing required field(s): {}", fields.join(", "))]
    MissingFields {
        path: PathBuf,
        fields: Vec<&'static str>,
    },

    /// A field is present but unusable.
    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// `dirs::home_dir()` returned `None`, so no default path exists.
    #[error("cannot determine home directory; pass --config explicitly")]
    HomeNotFound,
}

/// Errors raised while decoding a manifest document.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The document is not valid JSON/YAML.
    #[error("manifest is not valid JSON/YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The document parsed, but is neither a sequence nor a mapping.
    #[error("manifest must be a sequence or mapping of entries, found a {found}")]
    Shape { found: &'static str },

    /// One entry has fields of the wrong type.
    #[error("manifest entry at position {index} is malformed: {source}")]
    Entry {
        index: usize,
        #[source]
        source: serde_yaml::Error,
    },

    /// A mapping-form entry has a key that is not a scalar.
    #[error("manifest key at position {index} is not a scalar slug")]
    NonStringKey { index: usize },
}
