//! Engine configuration.
//!
//! Loaded from environment variables with defaults suitable for a single
//! controller instance.

use remedy_operation::ConfigError;

/// Orchestration settings shared by every transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Hold each new operation until the guard permits it.
    /// Default: `false` (operations start immediately).
    pub guard_enabled: bool,
    /// Deliver abatements to operations that have not sent yet.
    /// Default: `true`.
    pub abatement_before_send: bool,
    /// Upper bound on live transactions. Default: 10 000.
    pub max_transactions: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            guard_enabled: false,
            abatement_before_send: true,
            max_transactions: 10_000,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `REMEDY_GUARD_ENABLED` (default: `false`)
    /// - `REMEDY_ABATEMENT_BEFORE_SEND` (default: `true`)
    /// - `REMEDY_MAX_TRANSACTIONS` (default: 10000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup("REMEDY_GUARD_ENABLED") {
            config.guard_enabled = parse_bool("REMEDY_GUARD_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("REMEDY_ABATEMENT_BEFORE_SEND") {
            config.abatement_before_send = parse_bool("REMEDY_ABATEMENT_BEFORE_SEND", &raw)?;
        }
        if let Some(raw) = lookup("REMEDY_MAX_TRANSACTIONS") {
            config.max_transactions = raw
                .trim()
                .parse()
                .map_err(|_| invalid("REMEDY_MAX_TRANSACTIONS", &raw))?;
        }
        Ok(config)
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Ok(true),
        "0" | "false" | "no" | "n" => Ok(false),
        _ => Err(invalid(var, raw)),
    }
}

fn invalid(var: &str, raw: &str) -> ConfigError {
    ConfigError::InvalidValue {
        var: var.to_string(),
        value: raw.to_string(),
    }
}
