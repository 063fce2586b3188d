use reqwest::Method;
use tracing::info;

use super::{BatchUpdate, UpdateOutcome};
use crate::{client::MedusaClient, error::Result};

const UPDATE_EPISODE_STATUS_PATH: &str = "api/v2/internal/updateEpisodeStatus";

/// One POST covering every show, or nothing at all when there is nothing
/// to update.
pub(super) async fn apply(
    client: &MedusaClient,
    batch: &BatchUpdate,
) -> Result<UpdateOutcome> {
    let episodes = batch.episode_count();
    if episodes == 0 {
        info!("no episodes to update; skipping batch request");
        return Ok(UpdateOutcome::default());
    }

    client
        .send_json(Method::POST, UPDATE_EPISODE_STATUS_PATH, batch)
        .await?;

    info!(
        shows = batch.shows.len(),
        episodes,
        status = %batch.status,
        "batch status update accepted"
    );
    Ok(UpdateOutcome {
        requests: 1,
        episodes,
    })
}
