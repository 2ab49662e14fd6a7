//! Native configuration objects.
//!
//! A [`Config`] holds the parameters a context is created with. Parameters
//! are plain key/value strings; libz3 documents the accepted keys, among them:
//!
//! - `proof` (bool): enable proof generation
//! - `timeout` (unsigned): default solver timeout in milliseconds
//! - `model` (bool): model generation for solvers
//! - `model_validate` (bool): validate models produced by solvers
//! - `unsat_core` (bool): unsat-core generation for solvers
//! - `well_sorted_check` (bool): type checker
//! - `auto_config` (bool): pick solver heuristics automatically
//!
//! Extra parameters may be supplied through the `Z3_BRIDGE_PARAMS`
//! environment variable as `key=value` pairs separated by commas, for example
//! `Z3_BRIDGE_PARAMS="model=true,timeout=5000"`.

use z3_sys::{Z3_config, Z3_del_config, Z3_mk_config, Z3_set_param_value};

use crate::error::SolverError;
use crate::util::c_string;

/// Environment variable read by [`Config::from_env`].
pub const PARAMS_ENV: &str = "Z3_BRIDGE_PARAMS";

/// Owned `Z3_config`. Deleted on drop.
///
/// A config can be dropped as soon as the contexts created from it exist;
/// libz3 copies what it needs at context creation.
#[derive(Debug)]
pub struct Config {
    raw: Z3_config,
    params: Vec<(String, String)>,
}

impl Config {
    /// Allocate an empty configuration.
    pub fn new() -> Result<Self, SolverError> {
        // SAFETY: no preconditions.
        let raw = unsafe { Z3_mk_config() };
        if raw.is_null() {
            return Err(SolverError::NullHandle {
                what: "Z3_mk_config",
            });
        }
        Ok(Self {
            raw,
            params: Vec::new(),
        })
    }

    /// Allocate a configuration and apply the parameters in `Z3_BRIDGE_PARAMS`.
    ///
    /// Malformed entries are skipped with a warning; an unset variable yields
    /// an empty configuration.
    pub fn from_env() -> Result<Self, SolverError> {
        let mut config = Self::new()?;
        if let Ok(raw) = std::env::var(PARAMS_ENV) {
            for (key, value) in parse_param_list(&raw) {
                config.set_param(&key, &value)?;
            }
        }
        Ok(config)
    }

    /// Set one parameter.
    ///
    /// libz3 validates the key lazily and reports unknown keys as a warning,
    /// not through the error handler, since no context exists yet.
    pub fn set_param(&mut self, key: &str, value: &str) -> Result<(), SolverError> {
        let ck = c_string(key)?;
        let cv = c_string(value)?;
        // SAFETY: `raw` is live for `self`; the strings outlive the call and
        // are copied by libz3.
        unsafe { Z3_set_param_value(self.raw, ck.as_ptr(), cv.as_ptr()) };
        self.params.push((key.to_string(), value.to_string()));
        Ok(())
    }

    /// Builder form of [`Config::set_param`].
    pub fn with_param(mut self, key: &str, value: &str) -> Result<Self, SolverError> {
        self.set_param(key, value)?;
        Ok(self)
    }

    /// Parameters applied so far, in order.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Raw handle. Invalid once `self` is dropped.
    #[must_use]
    pub fn raw(&self) -> Z3_config {
        self.raw
    }
}

impl Drop for Config {
    fn drop(&mut self) {
        // SAFETY: `raw` was created by Z3_mk_config and is deleted once.
        unsafe { Z3_del_config(self.raw) };
    }
}

/// Parse `key=value,key=value` (loose: whitespace trimmed, bad entries skipped).
#[must_use]
pub fn parse_param_list(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match entry.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Some((key.trim().to_string(), value.trim().to_string()))
            }
            _ => {
                tracing::warn!(entry, "ignoring malformed {PARAMS_ENV} entry");
                None
            }
        })
        .collect()
}
