use thiserror::Error;

use crate::constants::{ENV_ENUMERATION, ENV_MEDUSA_API_KEY, ENV_MEDUSA_URL};
use crate::models::{Config, EnumerationPolicy};

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error(
        "source and target status are both {code}; \
         the migration would be a no-op"
    )]
    IdenticalStatuses { code: i32 },
    #[error("Medusa API key is empty")]
    EmptyApiKey,
    #[error("unsupported URL scheme `{scheme}` (expected http or https)")]
    UnsupportedScheme { scheme: String },
    #[error("HTTP timeout must be greater than zero")]
    ZeroTimeout,
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();
    let migration = &config.migration;

    if migration.source_status == migration.target_status {
        return Err(ConfigGuardRailError::IdenticalStatuses {
            code: migration.source_status,
        });
    }

    if config.target.api_key.trim().is_empty() {
        return Err(ConfigGuardRailError::EmptyApiKey);
    }

    let scheme = config.target.base_url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ConfigGuardRailError::UnsupportedScheme {
            scheme: scheme.to_string(),
        });
    }

    if config.http.timeout.is_zero() {
        return Err(ConfigGuardRailError::ZeroTimeout);
    }

    if config.target.is_default_api_key() {
        warnings.push_with_hint(
            "Medusa API key is the placeholder value; \
             requests will be rejected",
            format!("Set {ENV_MEDUSA_API_KEY} or pass --token"),
        );
    }

    if config.target.is_default_url() {
        warnings.push_with_hint(
            "Medusa URL is the default localhost address",
            format!("Set {ENV_MEDUSA_URL} or pass --medusa-url"),
        );
    }

    if scheme == "http" && !config.target.is_default_url() {
        warnings.push(
            "Medusa URL uses plain http; the API key is sent unencrypted",
        );
    }

    if config.http.accept_invalid_certs {
        warnings.push(
            "TLS certificate verification is disabled \
             for the Medusa connection",
        );
    }

    if !migration.protocol.scrapes()
        && migration.enumeration != EnumerationPolicy::Contiguous
    {
        warnings.push_with_hint(
            format!(
                "enumeration policy `{}` has no effect with the `{}` protocol",
                migration.enumeration, migration.protocol
            ),
            format!(
                "Unset {ENV_ENUMERATION} or switch to the v2/legacy protocol"
            ),
        );
    }

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use url::Url;

    use super::*;
    use crate::models::{HttpConfig, MigrationConfig, Protocol, TargetConfig};

    fn config() -> Config {
        Config {
            target: TargetConfig {
                base_url: Url::parse("https://medusa.lan:8081/").unwrap(),
                api_key: "0123456789abcdef".into(),
            },
            http: HttpConfig {
                timeout: Duration::from_secs(10),
                accept_invalid_certs: false,
            },
            migration: MigrationConfig {
                source_status: 4,
                target_status: 6,
                protocol: Protocol::Internal,
                enumeration: EnumerationPolicy::Contiguous,
                dry_run: false,
            },
        }
    }

    #[test]
    fn clean_config_has_no_warnings() {
        let warnings = apply_guard_rails(&config()).unwrap();
        assert!(warnings.is_empty(), "{:?}", warnings.items);
    }

    #[test]
    fn identical_statuses_are_rejected() {
        let mut cfg = config();
        cfg.migration.target_status = 4;
        let err = apply_guard_rails(&cfg).unwrap_err();
        assert!(matches!(
            err,
            ConfigGuardRailError::IdenticalStatuses { code: 4 }
        ));
    }

    #[test]
    fn empty_key_and_zero_timeout_are_rejected() {
        let mut cfg = config();
        cfg.target.api_key = "  ".into();
        assert!(matches!(
            apply_guard_rails(&cfg),
            Err(ConfigGuardRailError::EmptyApiKey)
        ));

        let mut cfg = config();
        cfg.http.timeout = Duration::ZERO;
        assert!(matches!(
            apply_guard_rails(&cfg),
            Err(ConfigGuardRailError::ZeroTimeout)
        ));
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let mut cfg = config();
        cfg.target.base_url = Url::parse("ftp://medusa.lan/").unwrap();
        assert!(matches!(
            apply_guard_rails(&cfg),
            Err(ConfigGuardRailError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn placeholder_key_and_insecure_tls_warn() {
        let mut cfg = config();
        cfg.target.api_key = "apikey".into();
        cfg.http.accept_invalid_certs = true;
        let warnings = apply_guard_rails(&cfg).unwrap();
        let messages: Vec<_> =
            warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("placeholder")));
        assert!(messages.iter().any(|m| m.contains("TLS")));
    }

    #[test]
    fn ignored_enumeration_policy_warns() {
        let mut cfg = config();
        cfg.migration.enumeration = EnumerationPolicy::AllKeys;
        let warnings = apply_guard_rails(&cfg).unwrap();
        assert_eq!(warnings.items.len(), 1);
        assert!(warnings.items[0].hint.is_some());

        cfg.migration.protocol = Protocol::V2;
        assert!(apply_guard_rails(&cfg).unwrap().is_empty());
    }
}
