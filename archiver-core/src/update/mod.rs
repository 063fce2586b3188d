//! Applying the destination status to discovered episodes.
//!
//! An [`UpdateRequest`] is built purely from discovery output and the
//! destination code, then handed to [`StatusUpdater::apply`]. Per-episode
//! requests are all attempted and their failures reported together; a batch
//! succeeds or fails as a whole.

mod batch;
mod per_episode;

use archiver_config::Protocol;
use serde::{Deserialize, Serialize};

use crate::{
    client::MedusaClient,
    error::Result,
    models::{DiscoveredShow, Episode, EpisodeStatus, Series},
};

/// How per-episode updates are addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerEpisodeStyle {
    /// `PATCH api/v2/series/<slug>/episodes`
    Patch,
    /// `GET home/setStatus?...`
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeUpdate {
    pub series: Series,
    pub episode: Episode,
    pub status: EpisodeStatus,
}

/// Body of `POST api/v2/internal/updateEpisodeStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchUpdate {
    pub status: EpisodeStatus,
    pub shows: Vec<BatchShow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchShow {
    pub slug: String,
    pub episodes: Vec<String>,
}

impl BatchUpdate {
    pub fn from_shows(shows: &[DiscoveredShow], status: EpisodeStatus) -> Self {
        let shows = shows
            .iter()
            .filter(|show| !show.episodes.is_empty())
            .map(|show| BatchShow {
                slug: show.series.slug.clone(),
                episodes: show.episodes.iter().map(Episode::slug).collect(),
            })
            .collect();
        Self { status, shows }
    }

    pub fn episode_count(&self) -> usize {
        self.shows.iter().map(|show| show.episodes.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateRequest {
    PerEpisode {
        style: PerEpisodeStyle,
        updates: Vec<EpisodeUpdate>,
    },
    Batch(BatchUpdate),
}

impl UpdateRequest {
    /// The request shape `protocol` uses for `shows`.
    pub fn build(
        protocol: Protocol,
        shows: &[DiscoveredShow],
        destination: EpisodeStatus,
    ) -> Self {
        let style = match protocol {
            Protocol::Internal => {
                return UpdateRequest::Batch(BatchUpdate::from_shows(
                    shows,
                    destination,
                ));
            }
            Protocol::V2 => PerEpisodeStyle::Patch,
            Protocol::Legacy => PerEpisodeStyle::Legacy,
        };

        let updates = shows
            .iter()
            .flat_map(|show| {
                show.episodes.iter().map(|episode| EpisodeUpdate {
                    series: show.series.clone(),
                    episode: episode.clone(),
                    status: destination,
                })
            })
            .collect();
        UpdateRequest::PerEpisode { style, updates }
    }

    pub fn episode_count(&self) -> usize {
        match self {
            UpdateRequest::PerEpisode { updates, .. } => updates.len(),
            UpdateRequest::Batch(batch) => batch.episode_count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.episode_count() == 0
    }
}

/// What an applied request amounted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// State-changing HTTP calls issued.
    pub requests: usize,
    pub episodes: usize,
}

#[derive(Debug, Clone)]
pub struct StatusUpdater {
    client: MedusaClient,
}

impl StatusUpdater {
    pub fn new(client: MedusaClient) -> Self {
        Self { client }
    }

    pub async fn apply(
        &self,
        request: &UpdateRequest,
    ) -> Result<UpdateOutcome> {
        match request {
            UpdateRequest::PerEpisode { style, updates } => {
                per_episode::apply(&self.client, *style, updates).await
            }
            UpdateRequest::Batch(batch) => {
                batch::apply(&self.client, batch).await
            }
        }
    }
}
