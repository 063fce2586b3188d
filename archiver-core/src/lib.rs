//! # Archiver Core
//!
//! Moves Medusa episodes from the "downloaded" status to the "archived"
//! status in one sequential run.
//!
//! ## Pipeline
//!
//! - [`status`]: reads the status directory (`api/v2/config`) so scraped
//!   status names can be matched against the configured source code
//! - [`discovery`]: finds the affected shows and episodes, either by scraping
//!   the management page and walking each `show.seasons` tree or through the
//!   internal aggregate endpoint
//! - [`update`]: turns discovery output into per-episode or batched update
//!   requests and applies them
//! - [`migration`]: sequences the above and reports what happened
//!
//! Everything shares a single [`client::MedusaClient`]; requests are issued
//! one at a time.
//!
//! ## Example
//!
//! ```no_run
//! use archiver_config::ConfigLoader;
//! use archiver_core::MigrationRunner;
//!
//! async fn archive() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().with_env_file(".env").load()?;
//!     let report = MigrationRunner::from_config(&config)?.run().await?;
//!     println!("archived {} episodes", report.episodes);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod discovery;
pub mod error;
pub mod migration;
pub mod models;
pub mod status;
pub mod update;

pub use client::MedusaClient;
pub use discovery::{AggregateDiscovery, EpisodeDiscovery, ScrapeDiscovery};
pub use error::{ArchiverError, EpisodeFailure, Result};
pub use migration::{MigrationPhase, MigrationReport, MigrationRunner};
pub use models::{DiscoveredShow, Episode, EpisodeStatus, Series};
pub use status::{StatusMap, StatusResolver};
pub use update::{
    BatchShow, BatchUpdate, EpisodeUpdate, PerEpisodeStyle, StatusUpdater,
    UpdateOutcome, UpdateRequest,
};
