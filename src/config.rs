//! Allocator configuration.
//!
//! Defaults are the safe choice: duplicate `(identity, order_dim)` rows fail
//! the run, input order is trusted, and under-supply is logged but not fatal.
//! Every knob can be overridden from the environment with
//! [`AllocatorConfig::from_env`].

use serde::{Deserialize, Serialize};

use crate::error::{AllocationError, Result};

/// Environment variable selecting [`UniquenessMode`]
pub const ENV_UNIQUENESS: &str = "FIFO_ALLOC_UNIQUENESS";
/// Environment variable toggling strict ordering validation
pub const ENV_STRICT_ORDERING: &str = "FIFO_ALLOC_STRICT_ORDERING";
/// Environment variable selecting [`UnderSupplyPolicy`]
pub const ENV_UNDER_SUPPLY: &str = "FIFO_ALLOC_UNDER_SUPPLY";

/// How duplicate `(identity, order_dim)` rows are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UniquenessMode {
    /// Fail with `UniquenessViolation`
    #[default]
    Strict,
    /// Skip the check; matching over duplicates is undefined
    Permissive,
}

/// What to do when outputs exceed cumulative supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnderSupplyPolicy {
    /// Fail the run with `UnderSupply`
    Fail,
    /// Log every shortfall at WARN and return them with the facts
    #[default]
    Warn,
    /// Return shortfalls without logging
    Truncate,
}

/// Pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AllocatorConfig {
    #[serde(default)]
    pub uniqueness: UniquenessMode,

    /// Reject events whose `order_dim` decreases within an identity
    #[serde(default)]
    pub strict_ordering: bool,

    #[serde(default)]
    pub under_supply: UnderSupplyPolicy,
}

impl AllocatorConfig {
    /// Strict on every axis: duplicates, ordering, and under-supply all fail
    #[must_use]
    pub fn strict() -> Self {
        Self {
            uniqueness: UniquenessMode::Strict,
            strict_ordering: true,
            under_supply: UnderSupplyPolicy::Fail,
        }
    }

    /// Replace the under-supply policy
    #[must_use]
    pub fn with_under_supply(mut self, policy: UnderSupplyPolicy) -> Self {
        self.under_supply = policy;
        self
    }

    /// Replace the uniqueness mode
    #[must_use]
    pub fn with_uniqueness(mut self, mode: UniquenessMode) -> Self {
        self.uniqueness = mode;
        self
    }

    /// Enable or disable strict ordering validation
    #[must_use]
    pub fn with_strict_ordering(mut self, strict: bool) -> Self {
        self.strict_ordering = strict;
        self
    }

    /// Load configuration from the environment, starting from defaults
    ///
    /// # Errors
    ///
    /// [`AllocationError::Config`] if a variable is set to an unknown value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_UNIQUENESS) {
            config.uniqueness = match value.trim().to_ascii_lowercase().as_str() {
                "strict" => UniquenessMode::Strict,
                "permissive" => UniquenessMode::Permissive,
                _ => return Err(invalid(ENV_UNIQUENESS, value)),
            };
        }
        if let Some(value) = lookup(ENV_STRICT_ORDERING) {
            config.strict_ordering = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => return Err(invalid(ENV_STRICT_ORDERING, value)),
            };
        }
        if let Some(value) = lookup(ENV_UNDER_SUPPLY) {
            config.under_supply = match value.trim().to_ascii_lowercase().as_str() {
                "fail" => UnderSupplyPolicy::Fail,
                "warn" => UnderSupplyPolicy::Warn,
                "truncate" => UnderSupplyPolicy::Truncate,
                _ => return Err(invalid(ENV_UNDER_SUPPLY, value)),
            };
        }

        Ok(config)
    }
}

fn invalid(key: &'static str, value: String) -> AllocationError {
    AllocationError::Config { key, value }
}
