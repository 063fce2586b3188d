use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiverError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("{method} {url} returned HTTP {status}")]
    Server {
        method: String,
        url: String,
        status: u16,
        body: Option<String>,
    },

    #[error("failed to resolve status directory: {reason}")]
    Resolution { reason: String },

    #[error("{} of {attempted} episode updates failed", failures.len())]
    UpdateFailures {
        attempted: usize,
        failures: Vec<EpisodeFailure>,
    },

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl ArchiverError {
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ArchiverError::Transport { source, .. } if source.is_timeout()
        )
    }

    /// HTTP status carried by a `Server` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ArchiverError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn resolution(reason: impl Into<String>) -> Self {
        ArchiverError::Resolution {
            reason: reason.into(),
        }
    }
}

/// One episode whose status update did not go through.
#[derive(Debug)]
pub struct EpisodeFailure {
    pub series_id: String,
    pub episode: String,
    pub error: ArchiverError,
}

impl fmt::Display for EpisodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "series {} {}: {}", self.series_id, self.episode, self.error)
    }
}

pub type Result<T> = std::result::Result<T, ArchiverError>;
