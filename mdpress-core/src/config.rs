//! Local configuration file.
//!
//! # Storage layout
//!
//! ```text
//! ~/.mdpress/
//!   config.yaml        (default --config)
//!   fingerprints.csv   (default fingerprint store)
//! ```
//!
//! The file is YAML; JSON is accepted too since it is a YAML subset.
//!
//! # API pattern
//!
//! Path helpers come in two forms, as elsewhere in the workspace:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Per-request timeout used when `timeout_secs` is not configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const CONFIG_FILE: &str = "config.yaml";
const FINGERPRINT_FILE: &str = "fingerprints.csv";

/// Validated runtime configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Where the manifest is fetched from.
    pub source_url: String,
    pub wordpress_domain: String,
    /// Target REST collection, e.g. `pages`.
    pub wordpress_type: String,
    pub username: String,
    /// Application password used for Basic auth.
    pub apikey: String,
    /// Explicit fingerprint store location, if configured.
    pub fingerprint_file: Option<PathBuf>,
    pub timeout: Duration,
}

// apikey is a credential; keep it out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("source_url", &self.source_url)
            .field("wordpress_domain", &self.wordpress_domain)
            .field("wordpress_type", &self.wordpress_type)
            .field("username", &self.username)
            .field("apikey", &"<redacted>")
            .field("fingerprint_file", &self.fingerprint_file)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    source_url: Option<String>,
    wordpress_domain: Option<String>,
    wordpress_type: Option<String>,
    username: Option<String>,
    apikey: Option<String>,
    fingerprint_file: Option<PathBuf>,
    timeout_secs: Option<u64>,
}

impl Config {
    /// Base URL of the WordPress REST API, without trailing slash.
    ///
    /// A bare domain gets `https://`; a domain that already names a scheme is
    /// used as-is.
    pub fn api_base(&self) -> String {
        let domain = self.wordpress_domain.trim().trim_end_matches('/');
        if domain.starts_with("http://") || domain.starts_with("https://") {
            format!("{domain}/wp-json/wp/v2")
        } else {
            format!("https://{domain}/wp-json/wp/v2")
        }
    }

    /// The fingerprint store path: the configured one, else the default under `home`.
    pub fn fingerprint_path_at(&self, home: &Path) -> PathBuf {
        self.fingerprint_file
            .clone()
            .unwrap_or_else(|| default_fingerprint_path_at(home))
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.mdpress/`
pub fn config_dir_at(home: &Path) -> PathBuf {
    home.join(".mdpress")
}

/// `<home>/.mdpress/config.yaml`
pub fn default_config_path_at(home: &Path) -> PathBuf {
    config_dir_at(home).join(CONFIG_FILE)
}

/// `<home>/.mdpress/config.yaml` (uses `dirs::home_dir()`).
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    Ok(default_config_path_at(&home()?))
}

/// `<home>/.mdpress/fingerprints.csv`
pub fn default_fingerprint_path_at(home: &Path) -> PathBuf {
    config_dir_at(home).join(FINGERPRINT_FILE)
}

pub fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Read and validate the config file at `path`.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(path, &contents)
}

/// Validate config `contents`; `path` is only used for error messages.
pub fn parse(path: &Path, contents: &str) -> Result<Config, ConfigError> {
    let raw: RawConfig = if contents.trim().is_empty() {
        RawConfig::default()
    } else {
        serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    };

    let mut missing = Vec::new();
    let mut required = |name: &'static str, value: Option<String>| -> String {
        match value.map(|v| v.trim().to_owned()) {
            Some(v) if !v.is_empty() => v,
            _ => {
                missing.push(name);
                String::new()
            }
        }
    };

    let source_url = required("source_url", raw.source_url);
    let wordpress_domain = required("wordpress_domain", raw.wordpress_domain);
    let wordpress_type = required("wordpress_type", raw.wordpress_type);
    let username = required("username", raw.username);
    let apikey = required("apikey", raw.apikey);

    if !missing.is_empty() {
        return Err(ConfigError::MissingFields {
            path: path.to_path_buf(),
            fields: missing,
        });
    }

    let timeout_secs = raw.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(ConfigError::Invalid {
            field: "timeout_secs",
            reason: "must be greater than zero".to_owned(),
        });
    }

    if wordpress_type.contains('/') {
        return Err(ConfigError::Invalid {
            field: "wordpress_type",
            reason: format!("'{wordpress_type}' must be a single collection name"),
        });
    }

    Ok(Config {
        source_url,
        wordpress_domain,
        wordpress_type,
        username,
        apikey,
        fingerprint_file: raw.fingerprint_file,
        timeout: Duration::from_secs(timeout_secs),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
