//! Builds a [`Config`] from the environment, an optional `.env` file and
//! command-line overrides, in that order of increasing precedence (the
//! process environment always wins over the file).

pub mod error;

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::Duration,
};

use tracing::debug;
use url::Url;

use crate::{
    constants::*,
    models::{
        Config, EnumerationPolicy, HttpConfig, MigrationConfig, Protocol,
        TargetConfig,
    },
    util::{non_blank, parse_bool},
    validation::{ConfigWarnings, apply_guard_rails},
};

use error::ConfigLoadError;

/// Values supplied on the command line. `None` leaves the environment value
/// (or default) in place.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub medusa_url: Option<String>,
    pub api_key: Option<String>,
    pub source_status: Option<i32>,
    pub target_status: Option<i32>,
    pub protocol: Option<Protocol>,
    pub enumeration: Option<EnumerationPolicy>,
    pub timeout: Option<Duration>,
    pub accept_invalid_certs: Option<bool>,
    pub dry_run: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    env_file: Option<PathBuf>,
    overrides: ConfigOverrides,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read additional variables from `path` when it exists. A missing file
    /// is not an error.
    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Load using the process environment.
    pub fn load(&self) -> Result<Config, ConfigLoadError> {
        self.load_from(|key| std::env::var(key).ok())
    }

    /// Load using the process environment and run the guard rails over the
    /// result. Hard failures surface as [`ConfigLoadError::GuardRail`].
    pub fn load_checked(
        &self,
    ) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
        self.load_checked_from(|key| std::env::var(key).ok())
    }

    /// [`Self::load_checked`] with `lookup` as the environment.
    pub fn load_checked_from<F>(
        &self,
        lookup: F,
    ) -> Result<(Config, ConfigWarnings), ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = self.load_from(lookup)?;
        let warnings = apply_guard_rails(&config)?;
        Ok((config, warnings))
    }

    /// Load using `lookup` as the environment.
    pub fn load_from<F>(&self, lookup: F) -> Result<Config, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_vars = match &self.env_file {
            Some(path) => read_env_file(path)?,
            None => HashMap::new(),
        };
        let var = |key: &str| {
            non_blank(lookup(key))
                .or_else(|| non_blank(file_vars.get(key).cloned()))
        };
        let overrides = &self.overrides;

        let raw_url = overrides
            .medusa_url
            .clone()
            .or_else(|| var(ENV_MEDUSA_URL))
            .unwrap_or_else(|| DEFAULT_MEDUSA_URL.to_string());
        let base_url = Url::parse(&raw_url).map_err(|source| {
            ConfigLoadError::InvalidUrl {
                value: raw_url.clone(),
                source,
            }
        })?;

        let api_key = overrides
            .api_key
            .clone()
            .or_else(|| var(ENV_MEDUSA_API_KEY))
            .unwrap_or_else(|| DEFAULT_API_KEY.to_string());

        let source_status = match overrides.source_status {
            Some(code) => code,
            None => status_var(&var, ENV_SOURCE_STATUS, DEFAULT_SOURCE_STATUS)?,
        };
        let target_status = match overrides.target_status {
            Some(code) => code,
            None => status_var(&var, ENV_TARGET_STATUS, DEFAULT_TARGET_STATUS)?,
        };

        let protocol = match overrides.protocol {
            Some(protocol) => protocol,
            None => match var(ENV_PROTOCOL) {
                Some(raw) => raw.parse().map_err(|reason| {
                    ConfigLoadError::InvalidValue {
                        key: ENV_PROTOCOL,
                        reason,
                    }
                })?,
                None => Protocol::default(),
            },
        };

        let enumeration = match overrides.enumeration {
            Some(policy) => policy,
            None => match var(ENV_ENUMERATION) {
                Some(raw) => raw.parse().map_err(|reason| {
                    ConfigLoadError::InvalidValue {
                        key: ENV_ENUMERATION,
                        reason,
                    }
                })?,
                None => EnumerationPolicy::default(),
            },
        };

        let timeout = match overrides.timeout {
            Some(timeout) => timeout,
            None => {
                let raw = var(ENV_HTTP_TIMEOUT)
                    .unwrap_or_else(|| DEFAULT_HTTP_TIMEOUT.to_string());
                humantime::parse_duration(&raw).map_err(|source| {
                    ConfigLoadError::InvalidDuration {
                        key: ENV_HTTP_TIMEOUT,
                        value: raw.clone(),
                        source,
                    }
                })?
            }
        };

        let accept_invalid_certs = match overrides.accept_invalid_certs {
            Some(flag) => flag,
            None => bool_var(&var, ENV_ACCEPT_INVALID_CERTS)?,
        };
        let dry_run = match overrides.dry_run {
            Some(flag) => flag,
            None => bool_var(&var, ENV_DRY_RUN)?,
        };

        let config = Config {
            target: TargetConfig { base_url, api_key },
            http: HttpConfig {
                timeout,
                accept_invalid_certs,
            },
            migration: MigrationConfig {
                source_status,
                target_status,
                protocol,
                enumeration,
                dry_run,
            },
        };
        debug!(?config, "configuration loaded");
        Ok(config)
    }
}

fn read_env_file(
    path: &Path,
) -> Result<HashMap<String, String>, ConfigLoadError> {
    if !path.exists() {
        debug!(path = %path.display(), "env file not present; skipping");
        return Ok(HashMap::new());
    }

    let to_err = |source| ConfigLoadError::EnvFileIo {
        path: path.to_path_buf(),
        source,
    };
    let mut vars = HashMap::new();
    for item in dotenvy::from_path_iter(path).map_err(to_err)? {
        let (key, value) = item.map_err(to_err)?;
        vars.insert(key, value);
    }
    Ok(vars)
}

fn status_var<F>(
    var: &F,
    key: &'static str,
    default: i32,
) -> Result<i32, ConfigLoadError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw.parse().map_err(|source| {
            ConfigLoadError::InvalidStatusCode {
                key,
                value: raw.clone(),
                source,
            }
        }),
        None => Ok(default),
    }
}

fn bool_var<F>(var: &F, key: &'static str) -> Result<bool, ConfigLoadError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => {
            parse_bool(&raw).ok_or_else(|| ConfigLoadError::InvalidValue {
                key,
                reason: format!("expected a boolean, got '{raw}'"),
            })
        }
        None => Ok(false),
    }
}
