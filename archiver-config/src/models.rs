use std::{fmt, str::FromStr, time::Duration};

use url::Url;

use crate::constants::{DEFAULT_API_KEY, DEFAULT_MEDUSA_URL};

#[derive(Debug, Clone)]
pub struct Config {
    pub target: TargetConfig,
    pub http: HttpConfig,
    pub migration: MigrationConfig,
}

/// Where the Medusa instance lives and how to authenticate against it.
#[derive(Clone)]
pub struct TargetConfig {
    pub base_url: Url,
    pub api_key: String,
}

impl TargetConfig {
    pub fn is_default_api_key(&self) -> bool {
        self.api_key == DEFAULT_API_KEY
    }

    pub fn is_default_url(&self) -> bool {
        self.base_url.as_str().trim_end_matches('/') == DEFAULT_MEDUSA_URL
    }

    /// Base URL without a trailing slash, ready for `format!("{base}/{path}")`.
    pub fn base(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }
}

impl fmt::Debug for TargetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetConfig")
            .field("base_url", &self.base_url.as_str())
            .field("has_api_key", &!self.api_key.is_empty())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub source_status: i32,
    pub target_status: i32,
    pub protocol: Protocol,
    pub enumeration: EnumerationPolicy,
    pub dry_run: bool,
}

/// API generation spoken by the target Medusa deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    /// `api/v2/internal` aggregate discovery with one batched update.
    #[default]
    Internal,
    /// Scraped discovery with per-episode `PATCH api/v2/series/..`.
    V2,
    /// Scraped discovery with per-episode `home/setStatus` calls.
    Legacy,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Internal => "internal",
            Protocol::V2 => "v2",
            Protocol::Legacy => "legacy",
        }
    }

    /// Whether discovery scrapes the management page and walks
    /// `show.seasons` trees (and therefore needs the status directory).
    pub fn scrapes(self) -> bool {
        matches!(self, Protocol::V2 | Protocol::Legacy)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "internal" | "batch" => Ok(Protocol::Internal),
            "v2" | "patch" => Ok(Protocol::V2),
            "legacy" | "v1" => Ok(Protocol::Legacy),
            other => Err(format!(
                "unknown protocol `{other}` (expected internal, v2 or legacy)"
            )),
        }
    }
}

/// How season and episode keys of a `show.seasons` tree are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumerationPolicy {
    /// Probe 1, 2, 3.. and stop at the first missing number.
    #[default]
    Contiguous,
    /// Visit every positive numeric key that is present.
    AllKeys,
}

impl EnumerationPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            EnumerationPolicy::Contiguous => "contiguous",
            EnumerationPolicy::AllKeys => "all-keys",
        }
    }
}

impl fmt::Display for EnumerationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnumerationPolicy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "contiguous" | "probe" => Ok(EnumerationPolicy::Contiguous),
            "all-keys" | "all_keys" | "all" => Ok(EnumerationPolicy::AllKeys),
            other => Err(format!(
                "unknown enumeration policy `{other}` \
                 (expected contiguous or all-keys)"
            )),
        }
    }
}
