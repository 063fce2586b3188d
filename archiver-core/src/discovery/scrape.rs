use std::collections::{BTreeMap, HashSet};

use archiver_config::EnumerationPolicy;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use tracing::debug;

use super::EpisodeDiscovery;
use crate::{
    client::{Auth, MedusaClient},
    error::{ArchiverError, Result},
    models::{DiscoveredShow, Episode, EpisodeStatus, Series},
    status::StatusMap,
};

const EPISODE_STATUSES_PATH: &str = "manage/episodeStatuses";
const SERIES_INPUT_SELECTOR: &str = "input.pull-right[data-series-id]";
const SERIES_ID_ATTR: &str = "data-series-id";

/// `season -> episode -> summary`, keys as Medusa renders them.
pub type SeasonTree = BTreeMap<String, BTreeMap<String, EpisodeSummary>>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EpisodeSummary {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SeasonsEnvelope {
    result: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct ScrapeDiscovery {
    client: MedusaClient,
    enumeration: EnumerationPolicy,
}

impl ScrapeDiscovery {
    pub fn new(client: MedusaClient, enumeration: EnumerationPolicy) -> Self {
        Self {
            client,
            enumeration,
        }
    }

    /// Series listed on the management page for `source`.
    pub async fn list_series(
        &self,
        source: EpisodeStatus,
    ) -> Result<Vec<Series>> {
        let html = self
            .client
            .get_text(
                EPISODE_STATUSES_PATH,
                &[("whichStatus", source.to_string())],
                Auth::Anonymous,
            )
            .await?;
        parse_series_listing(&html).map_err(|reason| ArchiverError::Decode {
            url: self.client.build_url(EPISODE_STATUSES_PATH),
            reason,
        })
    }

    /// The `show.seasons` tree of one series via the legacy API.
    pub async fn season_tree(&self, series_id: &str) -> Result<SeasonTree> {
        let path = format!("api/{}/", self.client.api_key());
        let envelope: SeasonsEnvelope = self
            .client
            .get_json(
                &path,
                &[
                    ("cmd", "show.seasons".to_string()),
                    ("tvdbid", series_id.to_string()),
                ],
                Auth::Anonymous,
            )
            .await?;

        let url = self.client.redact(&self.client.build_url(&path));
        if envelope.result != "success" {
            return Err(ArchiverError::Decode {
                url,
                reason: format!(
                    "show.seasons for series {series_id} returned `{}`: {}",
                    envelope.result,
                    envelope.message.unwrap_or_default()
                ),
            });
        }

        serde_json::from_value(envelope.data).map_err(|err| {
            ArchiverError::Decode {
                url,
                reason: format!("series {series_id}: {err}"),
            }
        })
    }
}

#[async_trait]
impl EpisodeDiscovery for ScrapeDiscovery {
    fn name(&self) -> &'static str {
        "scrape"
    }

    fn needs_status_map(&self) -> bool {
        true
    }

    async fn discover(
        &self,
        source: EpisodeStatus,
        statuses: Option<&StatusMap>,
    ) -> Result<Vec<DiscoveredShow>> {
        let statuses = statuses.ok_or_else(|| {
            ArchiverError::resolution(
                "scrape discovery requires the status directory",
            )
        })?;
        let status_name = statuses.require_name(source)?;

        let series = self.list_series(source).await?;
        debug!(count = series.len(), "series listed on management page");

        let mut shows = Vec::new();
        for series in series {
            let tree = self.season_tree(&series.id).await?;
            let episodes = collect_matching(
                &series.id,
                &tree,
                status_name,
                self.enumeration,
            );
            debug!(
                series = %series.id,
                matched = episodes.len(),
                "walked season tree"
            );
            if !episodes.is_empty() {
                shows.push(DiscoveredShow { series, episodes });
            }
        }
        Ok(shows)
    }
}

/// Series inputs on the management page, in page order without duplicates.
/// The display name is the text of the element right before each input.
pub fn parse_series_listing(
    html: &str,
) -> std::result::Result<Vec<Series>, String> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse(SERIES_INPUT_SELECTOR).map_err(|e| e.to_string())?;

    let mut seen = HashSet::new();
    let mut series = Vec::new();
    for input in document.select(&selector) {
        let Some(id) = input.value().attr(SERIES_ID_ATTR) else {
            continue;
        };
        let id = id.trim();
        if id.is_empty() || !seen.insert(id.to_string()) {
            continue;
        }

        let name = input
            .prev_siblings()
            .find_map(ElementRef::wrap)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        series.push(Series::from_tvdb(id, name));
    }
    Ok(series)
}

/// Episodes of `tree` whose status equals `status_name`, ascending.
///
/// With [`EnumerationPolicy::Contiguous`] seasons and episodes are probed
/// from 1 upwards and the walk stops at the first missing number, so
/// anything after a gap is not reported. [`EnumerationPolicy::AllKeys`]
/// visits every positive numeric key instead. Season 0 is never visited.
pub fn collect_matching(
    series_id: &str,
    tree: &SeasonTree,
    status_name: &str,
    policy: EnumerationPolicy,
) -> Vec<Episode> {
    let mut matches = Vec::new();
    for (season, episodes) in numbered(tree, policy) {
        for (number, summary) in numbered(episodes, policy) {
            if summary.status.as_deref() == Some(status_name) {
                matches.push(Episode::numbered(series_id, season, number));
            }
        }
    }
    matches
}

fn numbered<V>(
    map: &BTreeMap<String, V>,
    policy: EnumerationPolicy,
) -> Vec<(u32, &V)> {
    match policy {
        EnumerationPolicy::Contiguous => {
            let mut out = Vec::new();
            for n in 1.. {
                match map.get(&n.to_string()) {
                    Some(value) => out.push((n, value)),
                    None => break,
                }
            }
            out
        }
        EnumerationPolicy::AllKeys => {
            let mut out: Vec<(u32, &V)> = map
                .iter()
                .filter_map(|(key, value)| {
                    key.trim().parse::<u32>().ok().map(|n| (n, value))
                })
                .filter(|(n, _)| *n > 0)
                .collect();
            out.sort_by_key(|(n, _)| *n);
            out
        }
    }
}
