//! Finding the shows and episodes that currently sit at the source status.
//!
//! Two strategies exist, matching the API generations Medusa has shipped:
//! [`ScrapeDiscovery`] reads the episode-status management page and walks
//! each series' `show.seasons` tree, [`AggregateDiscovery`] asks the
//! internal v2 endpoint for everything in one call.

mod aggregate;
mod scrape;

pub use aggregate::AggregateDiscovery;
pub use scrape::{
    ScrapeDiscovery, SeasonTree, collect_matching, parse_series_listing,
};

use std::fmt;

use archiver_config::{EnumerationPolicy, Protocol};
use async_trait::async_trait;

use crate::{
    client::MedusaClient,
    error::Result,
    models::{DiscoveredShow, EpisodeStatus},
    status::StatusMap,
};

#[async_trait]
pub trait EpisodeDiscovery: Send + Sync + fmt::Debug {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Whether [`discover`](Self::discover) compares against status names
    /// and therefore needs the status directory.
    fn needs_status_map(&self) -> bool;

    /// Shows with at least one episode at `source`, each with its episodes
    /// in ascending order. An empty result is not an error.
    async fn discover(
        &self,
        source: EpisodeStatus,
        statuses: Option<&StatusMap>,
    ) -> Result<Vec<DiscoveredShow>>;
}

/// The discovery strategy a deployment speaking `protocol` uses.
pub fn for_protocol(
    protocol: Protocol,
    client: MedusaClient,
    enumeration: EnumerationPolicy,
) -> Box<dyn EpisodeDiscovery> {
    match protocol {
        Protocol::Internal => Box::new(AggregateDiscovery::new(client)),
        Protocol::V2 | Protocol::Legacy => {
            Box::new(ScrapeDiscovery::new(client, enumeration))
        }
    }
}
