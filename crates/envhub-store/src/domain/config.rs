//! # Store Configuration
//!
//! All values have defaults suitable for a single-writer deployment.

use std::time::Duration;

/// Listing cap applied to every prefix scan.
///
/// A key holding more bundles than this makes latest-version resolution
/// undercount. This is a known scaling limit of scan-based resolution.
pub const DEFAULT_LIST_LIMIT: usize = 1000;

/// Reason recorded when a writer supplies none.
pub const DEFAULT_CHANGE_REASON: &str = "Updated via API";

/// Configuration for the envhub store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum objects returned by a single listing (default: 1000).
    pub list_limit: usize,

    /// Deadline applied to each individual blob call (default: 10s).
    pub operation_timeout: Duration,

    /// Concurrent bundle fetches while rebuilding history (default: 8).
    pub history_concurrency: usize,

    /// How writes guard against a concurrent writer on the same key.
    pub write_policy: WritePolicy,

    /// What a read does with a token that fails to decrypt.
    pub decryption_policy: DecryptionPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            list_limit: DEFAULT_LIST_LIMIT,
            operation_timeout: Duration::from_secs(10),
            history_concurrency: 8,
            write_policy: WritePolicy::BestEffort,
            decryption_policy: DecryptionPolicy::FallbackToRaw,
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the listing cap.
    pub fn with_list_limit(mut self, limit: usize) -> Self {
        self.list_limit = limit.max(1);
        self
    }

    /// Set the per-call deadline.
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Set history fetch fan-out.
    pub fn with_history_concurrency(mut self, concurrency: usize) -> Self {
        self.history_concurrency = concurrency.max(1);
        self
    }

    /// Set the write policy.
    pub fn with_write_policy(mut self, policy: WritePolicy) -> Self {
        self.write_policy = policy;
        self
    }

    /// Set the decryption failure policy.
    pub fn with_decryption_policy(mut self, policy: DecryptionPolicy) -> Self {
        self.decryption_policy = policy;
        self
    }
}

/// Concurrency policy for bundle writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Resolve once and write once. If the resolved version already exists
    /// (racing writer, stale or capped listing) the push fails with
    /// `VersionConflict`.
    #[default]
    BestEffort,

    /// When the resolved version already exists, re-resolve and retry after
    /// `backoff * attempt`.
    Optimistic { max_attempts: u32, backoff: Duration },
}

impl WritePolicy {
    /// Optimistic policy with conventional defaults (5 attempts, 50ms steps).
    pub fn optimistic() -> Self {
        Self::optimistic_with_attempts(5)
    }

    /// Optimistic policy with the default 50ms backoff step.
    pub fn optimistic_with_attempts(max_attempts: u32) -> Self {
        WritePolicy::Optimistic {
            max_attempts: max_attempts.max(1),
            backoff: Duration::from_millis(50),
        }
    }
}

/// Behaviour when a stored token fails to decrypt during a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecryptionPolicy {
    /// Return the raw stored token as the value and report the variable name
    /// in `Bundle::undecryptable`.
    #[default]
    FallbackToRaw,

    /// Abort the whole read with `StoreError::Decryption`.
    Strict,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.list_limit, 1000);
        assert_eq!(config.write_policy, WritePolicy::BestEffort);
        assert_eq!(config.decryption_policy, DecryptionPolicy::FallbackToRaw);
    }

    #[test]
    fn test_builder_clamps_zero() {
        let config = StoreConfig::new()
            .with_list_limit(0)
            .with_history_concurrency(0)
            .with_write_policy(WritePolicy::optimistic());
        assert_eq!(config.list_limit, 1);
        assert_eq!(config.history_concurrency, 1);
        assert!(matches!(
            config.write_policy,
            WritePolicy::Optimistic { max_attempts: 5, .. }
        ));
    }
}
