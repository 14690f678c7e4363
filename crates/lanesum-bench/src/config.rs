//! Benchmark configuration and error types.
//!
//! Criterion owns the command line, so the one runtime knob, the random
//! seed, comes from the environment. Everything else about the run is a
//! compile-time constant in [`lanesum_core::constants`].

use std::env::{self, VarError};
use std::error::Error;
use std::fmt;

use lanesum_core::constants::BUFFER_BYTES;
use lanesum_core::BufferFiller;
use tracing::info;

/// Environment variable holding the random seed.
pub const SEED_ENV: &str = "LANESUM_RAND_SEED";

/// Seed sentinel meaning "seed from OS entropy".
pub const NO_SEED: i64 = -1;

// ── SeedConfig ─────────────────────────────────────────────────────

/// Optional seed for the input-buffer generator.
///
/// Any negative `rand_seed` means no seed was given.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedConfig {
    /// Raw seed value. Default: [`NO_SEED`].
    pub rand_seed: i64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { rand_seed: NO_SEED }
    }
}

impl SeedConfig {
    /// Read [`SEED_ENV`]. An unset variable yields the default.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidSeed`] if the variable is set but is not an
    /// integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var(SEED_ENV) {
            Ok(raw) => Self::from_value(Some(&raw)),
            Err(VarError::NotPresent) => Ok(Self::default()),
            Err(VarError::NotUnicode(raw)) => Err(ConfigError::InvalidSeed {
                value: raw.to_string_lossy().into_owned(),
            }),
        }
    }

    /// Parse a seed value, treating `None` and blank input as unset.
    pub fn from_value(value: Option<&str>) -> Result<Self, ConfigError> {
        let raw = match value.map(str::trim) {
            None | Some("") => return Ok(Self::default()),
            Some(raw) => raw,
        };
        raw.parse::<i64>()
            .map(|rand_seed| Self { rand_seed })
            .map_err(|_| ConfigError::InvalidSeed {
                value: raw.to_string(),
            })
    }

    /// The seed to use, or `None` for OS entropy.
    pub fn seed(&self) -> Option<u64> {
        u64::try_from(self.rand_seed).ok()
    }

    /// Build the filler every case of one run draws from.
    pub fn filler(&self) -> BufferFiller {
        match self.seed() {
            Some(seed) => info!(seed, "seeding input generator"),
            None => info!("seeding input generator from OS entropy"),
        }
        BufferFiller::new(self.seed())
    }
}

// ── BenchConfig ────────────────────────────────────────────────────

/// Settings for one `sum_kernels` run.
#[derive(Clone, Debug)]
pub struct BenchConfig {
    /// Input seed.
    pub seed: SeedConfig,
    /// Criterion group name. Default: `"sum_kernels"`.
    pub group_name: String,
}

impl BenchConfig {
    /// Default Criterion group name.
    pub const DEFAULT_GROUP: &'static str = "sum_kernels";

    /// Default settings with the seed read from [`SEED_ENV`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            seed: SeedConfig::from_env()?,
            ..Self::default()
        })
    }

    /// Bytes touched by one kernel invocation: two inputs read, one output
    /// written.
    pub fn bytes_per_iteration(&self) -> u64 {
        3 * BUFFER_BYTES as u64
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            seed: SeedConfig::default(),
            group_name: Self::DEFAULT_GROUP.to_string(),
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while reading benchmark configuration.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// [`SEED_ENV`] is set but is not an integer.
    InvalidSeed {
        /// The rejected value.
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSeed { value } => {
                write!(f, "{SEED_ENV} must be an integer, got '{value}'")
            }
        }
    }
}

impl Error for ConfigError {}
