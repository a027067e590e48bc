//! Document retrieval for the manifest and the Markdown sources it lists.
//!
//! `http://` and `https://` locations go through a blocking `ureq` agent with
//! a fixed per-request timeout. Anything else is a local path, optionally
//! written as a `file://` URL.

use std::path::PathBuf;
use std::time::Duration;

use ureq::Agent;

use crate::error::FetchError;

/// Something that can turn a source reference into document text.
pub trait DocumentSource {
    fn fetch(&self, location: &str) -> Result<String, FetchError>;
}

/// Build the blocking HTTP agent shared by fetching and publishing.
pub fn build_agent(timeout: Duration) -> Agent {
    ureq::AgentBuilder::new()
        .timeout(timeout)
        .user_agent(concat!("mdpress/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// `true` if `location` should be fetched over HTTP.
pub fn is_remote(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Fetches over HTTP(S) or from the local filesystem.
#[derive(Debug, Clone)]
pub struct Fetcher {
    agent: Agent,
}

impl Fetcher {
    pub fn new(agent: Agent) -> Self {
        Self { agent }
    }

    fn fetch_http(&self, url: &str) -> Result<String, FetchError> {
        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => {
                return Err(FetchError::Status {
                    url: url.to_owned(),
                    status,
                })
            }
            Err(ureq::Error::Transport(t)) => {
                return Err(FetchError::Transport {
                    url: url.to_owned(),
                    reason: t.to_string(),
                })
            }
        };
        response.into_string().map_err(|e| FetchError::Transport {
            url: url.to_owned(),
            reason: e.to_string(),
        })
    }
}

impl DocumentSource for Fetcher {
    fn fetch(&self, location: &str) -> Result<String, FetchError> {
        let location = location.trim();
        if is_remote(location) {
            tracing::debug!(url = location, "fetching");
            return self.fetch_http(location);
        }

        let path = PathBuf::from(location.strip_prefix("file://").unwrap_or(location));
        std::fs::read_to_string(&path).map_err(|source| FetchError::Io { path, source })
    }
}
