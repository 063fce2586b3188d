use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::EpisodeDiscovery;
use crate::{
    client::{Auth, MedusaClient},
    error::Result,
    models::{
        DiscoveredShow, Episode, EpisodeStatus, Series, parse_episode_slug,
    },
    status::StatusMap,
};

const EPISODE_STATUS_PATH: &str = "api/v2/internal/getEpisodeStatus";

/// `group -> series slug -> show`; group keys carry no meaning.
type AggregateResponse = BTreeMap<String, BTreeMap<String, AggregateShow>>;

#[derive(Debug, Deserialize)]
struct AggregateShow {
    #[serde(default)]
    name: String,
    #[serde(default)]
    episodes: Vec<AggregateEpisode>,
}

#[derive(Debug, Deserialize)]
struct AggregateEpisode {
    slug: String,
    #[serde(default)]
    season: Option<u32>,
    #[serde(default)]
    episode: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct AggregateDiscovery {
    client: MedusaClient,
}

impl AggregateDiscovery {
    pub fn new(client: MedusaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EpisodeDiscovery for AggregateDiscovery {
    fn name(&self) -> &'static str {
        "aggregate"
    }

    fn needs_status_map(&self) -> bool {
        false
    }

    async fn discover(
        &self,
        source: EpisodeStatus,
        _statuses: Option<&StatusMap>,
    ) -> Result<Vec<DiscoveredShow>> {
        let response: AggregateResponse = self
            .client
            .get_json(
                EPISODE_STATUS_PATH,
                &[("status", source.to_string())],
                Auth::ApiKey,
            )
            .await?;
        debug!(groups = response.len(), "internal episode status response");

        Ok(flatten(response))
    }
}

/// Merge every group into one show list ordered by slug. Episodes are
/// deduplicated and ascending; shows without episodes are dropped.
fn flatten(response: AggregateResponse) -> Vec<DiscoveredShow> {
    let mut merged: BTreeMap<String, (String, BTreeSet<Episode>)> =
        BTreeMap::new();

    for (_group, shows) in response {
        for (slug, show) in shows {
            let entry = merged
                .entry(slug.clone())
                .or_insert_with(|| (String::new(), BTreeSet::new()));
            if entry.0.is_empty() {
                entry.0 = show.name;
            }
            for episode in show.episodes {
                entry.1.insert(to_episode(&slug, episode));
            }
        }
    }

    merged
        .into_iter()
        .filter(|(_, (_, episodes))| !episodes.is_empty())
        .map(|(slug, (name, episodes))| DiscoveredShow {
            series: Series::from_slug(slug, name),
            episodes: episodes.into_iter().collect(),
        })
        .collect()
}

/// The slug is what the batch update needs; numbers are informational and
/// stay 0 when neither the fields nor the slug carry them.
fn to_episode(series_slug: &str, raw: AggregateEpisode) -> Episode {
    let (season, number) = match (raw.season, raw.episode) {
        (Some(season), Some(number)) => (season, number),
        _ => parse_episode_slug(&raw.slug).unwrap_or_else(|| {
            debug!(
                series = series_slug,
                slug = %raw.slug,
                "episode slug carries no season/episode numbers"
            );
            (0, 0)
        }),
    };
    Episode {
        series_id: series_slug.to_string(),
        season,
        number,
        slug: Some(raw.slug),
    }
}
