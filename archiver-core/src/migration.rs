//! Drives one migration run from status resolution to the final update.

use std::fmt;

use archiver_config::{Config, Protocol};
use tracing::info;

use crate::{
    client::MedusaClient,
    discovery::{self, EpisodeDiscovery},
    error::Result,
    models::{DiscoveredShow, EpisodeStatus, total_episodes},
    status::{StatusMap, StatusResolver},
    update::{StatusUpdater, UpdateRequest},
};

/// Linear phases of a run; any error leaves the machine where it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationPhase {
    Start,
    ResolveStatuses,
    Discover,
    BuildUpdateRequest,
    Apply,
    Done,
}

impl fmt::Display for MigrationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MigrationPhase::Start => "start",
            MigrationPhase::ResolveStatuses => "resolve-statuses",
            MigrationPhase::Discover => "discover",
            MigrationPhase::BuildUpdateRequest => "build-update-request",
            MigrationPhase::Apply => "apply",
            MigrationPhase::Done => "done",
        };
        f.write_str(label)
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub shows: usize,
    pub episodes: usize,
    /// State-changing HTTP calls issued.
    pub requests: usize,
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct MigrationRunner {
    resolver: StatusResolver,
    discovery: Box<dyn EpisodeDiscovery>,
    updater: StatusUpdater,
    protocol: Protocol,
    source: EpisodeStatus,
    destination: EpisodeStatus,
    dry_run: bool,
}

impl MigrationRunner {
    /// Wire every component for `config` around one shared client.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = MedusaClient::new(&config.target, &config.http)?;
        let migration = &config.migration;
        Ok(Self {
            resolver: StatusResolver::new(client.clone()),
            discovery: discovery::for_protocol(
                migration.protocol,
                client.clone(),
                migration.enumeration,
            ),
            updater: StatusUpdater::new(client),
            protocol: migration.protocol,
            source: EpisodeStatus(migration.source_status),
            destination: EpisodeStatus(migration.target_status),
            dry_run: migration.dry_run,
        })
    }

    pub async fn run(&self) -> Result<MigrationReport> {
        self.enter(MigrationPhase::Start);

        let statuses = if self.discovery.needs_status_map() {
            self.enter(MigrationPhase::ResolveStatuses);
            Some(self.resolver.resolve().await?)
        } else {
            None
        };

        self.enter(MigrationPhase::Discover);
        let shows = self.discover(statuses.as_ref()).await?;
        let episodes = total_episodes(&shows);
        info!(
            shows = shows.len(),
            episodes,
            source = %self.source,
            "discovery finished"
        );

        self.enter(MigrationPhase::BuildUpdateRequest);
        let request =
            UpdateRequest::build(self.protocol, &shows, self.destination);

        let mut report = MigrationReport {
            shows: shows.len(),
            episodes,
            requests: 0,
            dry_run: self.dry_run,
        };

        if self.dry_run {
            info!(
                episodes = request.episode_count(),
                destination = %self.destination,
                "dry run; no status updates sent"
            );
            self.enter(MigrationPhase::Done);
            return Ok(report);
        }

        self.enter(MigrationPhase::Apply);
        let outcome = self.updater.apply(&request).await?;
        report.requests = outcome.requests;

        self.enter(MigrationPhase::Done);
        info!(
            episodes = outcome.episodes,
            requests = outcome.requests,
            destination = %self.destination,
            "migration complete"
        );
        Ok(report)
    }

    /// Discovery alone, logging every show and episode found.
    pub async fn discover(
        &self,
        statuses: Option<&StatusMap>,
    ) -> Result<Vec<DiscoveredShow>> {
        let shows = self.discovery.discover(self.source, statuses).await?;
        for show in &shows {
            for episode in &show.episodes {
                info!(
                    show = %show.series.name,
                    series = %show.series.id,
                    season = episode.season,
                    episode = episode.number,
                    "found episode at source status"
                );
            }
        }
        Ok(shows)
    }

    /// The target system's status directory.
    pub async fn statuses(&self) -> Result<StatusMap> {
        self.resolver.resolve().await
    }

    fn enter(&self, phase: MigrationPhase) {
        info!(%phase, strategy = self.discovery.name(), "migration phase");
    }
}
