//! Configuration library for the Medusa episode archiver.
//!
//! Loads the target system address, API token, status pair and protocol
//! selection from the environment (optionally seeded from a `.env` file),
//! and validates the result before any request is issued. The loaded
//! [`Config`] is passed explicitly into every component of `archiver-core`.

pub mod constants;
pub mod loader;
pub mod models;
pub mod util;
pub mod validation;

pub use loader::{ConfigLoader, ConfigOverrides, error::ConfigLoadError};
pub use models::{
    Config, EnumerationPolicy, HttpConfig, MigrationConfig, Protocol,
    TargetConfig,
};
pub use validation::{
    ConfigGuardRailError, ConfigWarning, ConfigWarnings, apply_guard_rails,
};
