use reqwest::Method;
use serde_json::{Map, Value, json};
use tracing::{error, info, warn};

use super::{EpisodeUpdate, PerEpisodeStyle, UpdateOutcome};
use crate::{
    client::{Auth, MedusaClient},
    error::{ArchiverError, EpisodeFailure, Result},
};

const SET_STATUS_PATH: &str = "home/setStatus";

/// Attempts every update, then reports all failures at once.
pub(super) async fn apply(
    client: &MedusaClient,
    style: PerEpisodeStyle,
    updates: &[EpisodeUpdate],
) -> Result<UpdateOutcome> {
    let mut failures = Vec::new();

    for update in updates {
        let result = match style {
            PerEpisodeStyle::Patch => patch(client, update).await,
            PerEpisodeStyle::Legacy => legacy(client, update).await,
        };
        match result {
            Ok(()) => info!(
                show = %update.series.name,
                series = %update.series.id,
                episode = %update.episode,
                status = %update.status,
                "episode updated"
            ),
            Err(err) => {
                error!(
                    show = %update.series.name,
                    series = %update.series.id,
                    episode = %update.episode,
                    http_status = err.status(),
                    error = %err,
                    "episode update failed"
                );
                failures.push(EpisodeFailure {
                    series_id: update.series.id.clone(),
                    episode: update.episode.slug(),
                    error: err,
                });
            }
        }
    }

    if !failures.is_empty() {
        warn!(
            failed = failures.len(),
            attempted = updates.len(),
            "some episode updates failed"
        );
        return Err(ArchiverError::UpdateFailures {
            attempted: updates.len(),
            failures,
        });
    }

    Ok(UpdateOutcome {
        requests: updates.len(),
        episodes: updates.len(),
    })
}

/// `{"<episode slug>": {"status": <code>}}` for one episode.
pub(super) fn patch_body(update: &EpisodeUpdate) -> Value {
    let mut body = Map::new();
    body.insert(
        update.episode.slug(),
        json!({ "status": update.status.code() }),
    );
    Value::Object(body)
}

async fn patch(client: &MedusaClient, update: &EpisodeUpdate) -> Result<()> {
    let path = format!("api/v2/series/{}/episodes", update.series.slug);
    client
        .send_json(Method::PATCH, &path, &patch_body(update))
        .await
}

async fn legacy(client: &MedusaClient, update: &EpisodeUpdate) -> Result<()> {
    client
        .get_text(
            SET_STATUS_PATH,
            &[
                ("indexername", "tvdb".to_string()),
                ("seriesid", update.series.id.clone()),
                ("eps", update.episode.slug()),
                ("status", update.status.to_string()),
            ],
            Auth::Anonymous,
        )
        .await
        .map(|_| ())
}
