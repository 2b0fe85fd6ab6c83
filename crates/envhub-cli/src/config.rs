//! Configuration loaded from `ENVHUB_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use envhub_store::{DecryptionPolicy, KeyError, MasterKey, StoreConfig, WritePolicy};
use tracing::warn;

/// Directory used when `ENVHUB_DATA_DIR` is unset.
pub const DEFAULT_DATA_DIR: &str = ".envhub";

/// Settings for one CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Base64 master key material. `None` selects the insecure default.
    pub master_key: Option<String>,
    pub data_dir: PathBuf,
    pub list_limit: Option<usize>,
    pub operation_timeout: Option<Duration>,
    /// Optimistic write attempts; unset keeps best-effort writes.
    pub write_retries: Option<u32>,
    pub strict_decrypt: bool,
    /// Identity recorded as `created_by` when `--author` is absent.
    pub user: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            master_key: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            list_limit: None,
            operation_timeout: None,
            write_retries: None,
            strict_decrypt: false,
            user: None,
        }
    }
}

impl CliConfig {
    /// Read configuration from the process environment.
    pub fn load() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`. Unparseable values are logged and
    /// ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        config.master_key = get("ENVHUB_MASTER_KEY");

        if let Some(dir) = get("ENVHUB_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        config.list_limit = parse_var("ENVHUB_LIST_LIMIT", get("ENVHUB_LIST_LIMIT"));
        config.operation_timeout =
            parse_var::<u64>("ENVHUB_TIMEOUT_SECS", get("ENVHUB_TIMEOUT_SECS"))
                .map(Duration::from_secs);
        config.write_retries = parse_var("ENVHUB_WRITE_RETRIES", get("ENVHUB_WRITE_RETRIES"));

        if let Some(flag) = get("ENVHUB_STRICT_DECRYPT") {
            config.strict_decrypt = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    warn!("ENVHUB_STRICT_DECRYPT must be a boolean, got '{}'", other);
                    false
                }
            };
        }

        config.user = get("ENVHUB_USER").or_else(|| get("USER"));
        config
    }

    /// Resolve the master key, falling back to the insecure default when
    /// none is configured.
    pub fn master_key(&self) -> Result<MasterKey, KeyError> {
        MasterKey::resolve(self.master_key.as_deref())
    }

    /// Engine configuration derived from these settings.
    pub fn store_config(&self) -> StoreConfig {
        let mut store = StoreConfig::default();
        if let Some(limit) = self.list_limit {
            store = store.with_list_limit(limit);
        }
        if let Some(timeout) = self.operation_timeout {
            store = store.with_operation_timeout(timeout);
        }
        if let Some(retries) = self.write_retries {
            store = store.with_write_policy(WritePolicy::optimistic_with_attempts(retries));
        }
        if self.strict_decrypt {
            store = store.with_decryption_policy(DecryptionPolicy::Strict);
        }
        store
    }

    /// `created_by` for writes: explicit author, configured user, or
    /// `"unknown"`.
    pub fn author(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .or_else(|| self.user.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: Option<String>) -> Option<T> {
    let value = value?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("{} has an invalid value '{}', ignoring", name, value);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> CliConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CliConfig::from_lookup(|name| env.get(name).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = config_from(&[]);
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.data_dir, PathBuf::from(".envhub"));
        assert_eq!(config.store_config(), StoreConfig::default());
        assert!(config.master_key().unwrap().is_insecure_default());
    }

    #[test]
    fn test_values_are_read() {
        let key = MasterKey::generate().to_base64();
        let config = config_from(&[
            ("ENVHUB_MASTER_KEY", key.as_str()),
            ("ENVHUB_DATA_DIR", "/var/lib/envhub"),
            ("ENVHUB_LIST_LIMIT", "50"),
            ("ENVHUB_TIMEOUT_SECS", "3"),
            ("ENVHUB_WRITE_RETRIES", "4"),
            ("ENVHUB_STRICT_DECRYPT", "true"),
            ("ENVHUB_USER", "alice"),
        ]);

        assert_eq!(config.data_dir, PathBuf::from("/var/lib/envhub"));
        assert!(!config.master_key().unwrap().is_insecure_default());

        let store = config.store_config();
        assert_eq!(store.list_limit, 50);
        assert_eq!(store.operation_timeout, Duration::from_secs(3));
        assert!(matches!(
            store.write_policy,
            WritePolicy::Optimistic { max_attempts: 4, .. }
        ));
        assert_eq!(store.decryption_policy, DecryptionPolicy::Strict);
        assert_eq!(config.author(None), "alice");
    }

    #[test]
    fn test_invalid_numbers_are_ignored() {
        let config = config_from(&[
            ("ENVHUB_LIST_LIMIT", "lots"),
            ("ENVHUB_TIMEOUT_SECS", "-1"),
            ("ENVHUB_STRICT_DECRYPT", "maybe"),
        ]);
        assert_eq!(config.list_limit, None);
        assert_eq!(config.operation_timeout, None);
        assert!(!config.strict_decrypt);
    }

    #[test]
    fn test_invalid_master_key_is_an_error() {
        let config = config_from(&[("ENVHUB_MASTER_KEY", "c2hvcnQ=")]);
        assert!(config.master_key().is_err());
    }

    #[test]
    fn test_author_precedence() {
        let config = config_from(&[("USER", "shell-user")]);
        assert_eq!(config.author(Some("ci-bot")), "ci-bot");
        assert_eq!(config.author(Some("  ")), "shell-user");
        assert_eq!(config.author(None), "shell-user");
        assert_eq!(config_from(&[]).author(None), "unknown");
    }
}
