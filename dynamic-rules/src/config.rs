//! Round-level configuration for dynamic threat sizing and drafting.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_HIGHPOP_THRESHOLD, DEFAULT_LOWPOP_THRESHOLD, DEFAULT_MAX_THREAT,
    DEFAULT_MIDROUND_POOL, DEFAULT_ROUNDSTART_POOL,
};

/// Errors raised when dynamic configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a finite number (got {value})")]
    NotFinite { field: &'static str, value: f32 },
    #[error("{field} must be at least {min:.2} (got {value:.2})")]
    MinViolation {
        field: &'static str,
        min: f32,
        value: f32,
    },
    #[error("highpop threshold {highpop:.2} is below lowpop threshold {lowpop:.2}")]
    ThresholdOrder { lowpop: f32, highpop: f32 },
    #[error("{field} must name a ruleset pool")]
    EmptyPool { field: &'static str },
}

/// Thresholds, ceilings and pool ids read once per round start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicConfig {
    /// Players below this count halve the max threat; above it raise the min threat.
    #[serde(default = "DynamicConfig::default_lowpop_threshold")]
    pub lowpop_threshold: f32,
    /// Players at or above this count add extra max threat.
    #[serde(default = "DynamicConfig::default_highpop_threshold")]
    pub highpop_threshold: f32,
    #[serde(default = "DynamicConfig::default_max_threat")]
    pub max_threat: f32,
    /// Allow more than one high-impact ruleset per drafting pass.
    #[serde(default)]
    pub unforgiving: bool,
    #[serde(default = "DynamicConfig::default_roundstart_pool")]
    pub roundstart_pool: String,
    #[serde(default = "DynamicConfig::default_midround_pool")]
    pub midround_pool: String,
}

impl DynamicConfig {
    const fn default_lowpop_threshold() -> f32 {
        DEFAULT_LOWPOP_THRESHOLD
    }

    const fn default_highpop_threshold() -> f32 {
        DEFAULT_HIGHPOP_THRESHOLD
    }

    const fn default_max_threat() -> f32 {
        DEFAULT_MAX_THREAT
    }

    fn default_roundstart_pool() -> String {
        String::from(DEFAULT_ROUNDSTART_POOL)
    }

    fn default_midround_pool() -> String {
        String::from(DEFAULT_MIDROUND_POOL)
    }

    /// Load configuration from a JSON string, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check the configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("lowpop_threshold", self.lowpop_threshold),
            ("highpop_threshold", self.highpop_threshold),
            ("max_threat", self.max_threat),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
            if value < 0.0 {
                return Err(ConfigError::MinViolation {
                    field,
                    min: 0.0,
                    value,
                });
            }
        }
        if self.highpop_threshold < self.lowpop_threshold {
            return Err(ConfigError::ThresholdOrder {
                lowpop: self.lowpop_threshold,
                highpop: self.highpop_threshold,
            });
        }
        if self.roundstart_pool.trim().is_empty() {
            return Err(ConfigError::EmptyPool {
                field: "roundstart_pool",
            });
        }
        if self.midround_pool.trim().is_empty() {
            return Err(ConfigError::EmptyPool {
                field: "midround_pool",
            });
        }
        Ok(())
    }
}

impl Default for DynamicConfig {
    fn default() -> Self {
        Self {
            lowpop_threshold: Self::default_lowpop_threshold(),
            highpop_threshold: Self::default_highpop_threshold(),
            max_threat: Self::default_max_threat(),
            unforgiving: false,
            roundstart_pool: Self::default_roundstart_pool(),
            midround_pool: Self::default_midround_pool(),
        }
    }
}
