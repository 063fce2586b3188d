//! Environment keys and defaults.

pub const ENV_MEDUSA_URL: &str = "MEDUSA_URL";
pub const ENV_MEDUSA_API_KEY: &str = "MEDUSA_API_KEY";
pub const ENV_SOURCE_STATUS: &str = "ARCHIVER_SOURCE_STATUS";
pub const ENV_TARGET_STATUS: &str = "ARCHIVER_TARGET_STATUS";
pub const ENV_PROTOCOL: &str = "ARCHIVER_PROTOCOL";
pub const ENV_ENUMERATION: &str = "ARCHIVER_ENUMERATION";
pub const ENV_HTTP_TIMEOUT: &str = "ARCHIVER_HTTP_TIMEOUT";
pub const ENV_ACCEPT_INVALID_CERTS: &str = "ARCHIVER_ACCEPT_INVALID_CERTS";
pub const ENV_DRY_RUN: &str = "ARCHIVER_DRY_RUN";

pub const DEFAULT_MEDUSA_URL: &str = "http://localhost:8081";
pub const DEFAULT_API_KEY: &str = "apikey";
/// Medusa's `DOWNLOADED` status.
pub const DEFAULT_SOURCE_STATUS: i32 = 4;
/// Medusa's `ARCHIVED` status.
pub const DEFAULT_TARGET_STATUS: i32 = 6;
pub const DEFAULT_HTTP_TIMEOUT: &str = "10s";
