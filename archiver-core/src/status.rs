//! Status directory: Medusa's numeric status codes and their names, read
//! from `api/v2/config` once per run.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    client::{Auth, MedusaClient},
    error::{ArchiverError, Result},
    models::EpisodeStatus,
};

const CONFIG_PATH: &str = "api/v2/config";

/// Bidirectional code ↔ name mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusMap {
    by_code: BTreeMap<EpisodeStatus, String>,
    by_name: BTreeMap<String, EpisodeStatus>,
}

impl StatusMap {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (EpisodeStatus, S)>,
        S: Into<String>,
    {
        let mut map = StatusMap::default();
        for (code, name) in entries {
            let name = name.into();
            map.by_name.insert(name.to_ascii_lowercase(), code);
            map.by_code.insert(code, name);
        }
        map
    }

    pub fn name(&self, code: EpisodeStatus) -> Option<&str> {
        self.by_code.get(&code).map(String::as_str)
    }

    /// Lookup by the code's string form, as Medusa renders it.
    pub fn name_for(&self, code: &str) -> Option<&str> {
        code.trim()
            .parse::<i32>()
            .ok()
            .and_then(|code| self.name(EpisodeStatus(code)))
    }

    /// Case-insensitive lookup of a status name.
    pub fn code(&self, name: &str) -> Option<EpisodeStatus> {
        self.by_name.get(&name.trim().to_ascii_lowercase()).copied()
    }

    pub fn require_name(&self, code: EpisodeStatus) -> Result<&str> {
        self.name(code).ok_or_else(|| {
            ArchiverError::resolution(format!(
                "status code {code} is not defined by the target system"
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Entries in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = (EpisodeStatus, &str)> {
        self.by_code.iter().map(|(code, name)| (*code, name.as_str()))
    }
}

#[derive(Debug, Deserialize)]
struct ConfigDocument {
    consts: Option<Consts>,
}

#[derive(Debug, Deserialize)]
struct Consts {
    statuses: Option<Vec<StatusEntry>>,
}

#[derive(Debug, Deserialize)]
struct StatusEntry {
    value: i32,
    name: String,
}

/// Fetches the status directory.
#[derive(Debug, Clone)]
pub struct StatusResolver {
    client: MedusaClient,
}

impl StatusResolver {
    pub fn new(client: MedusaClient) -> Self {
        Self { client }
    }

    pub async fn resolve(&self) -> Result<StatusMap> {
        let document: ConfigDocument = self
            .client
            .get_json(CONFIG_PATH, &[], Auth::ApiKey)
            .await
            .map_err(|err| ArchiverError::resolution(err.to_string()))?;

        let statuses = document
            .consts
            .and_then(|consts| consts.statuses)
            .ok_or_else(|| {
                ArchiverError::resolution(
                    "configuration document has no consts.statuses list",
                )
            })?;

        let map = StatusMap::from_entries(
            statuses
                .into_iter()
                .map(|entry| (EpisodeStatus(entry.value), entry.name)),
        );
        for (code, name) in map.iter() {
            debug!("|{code}|{name}|");
        }
        info!(statuses = map.len(), "resolved status directory");
        Ok(map)
    }
}
