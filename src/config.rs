//! Run configuration shared by hosts: how far a batch run may go, how nondeterminism is
//! seeded, and how fast a timer-driven host steps.

use crate::types::{MachineError, MAX_EXECUTION_STEPS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// The fixed set of intervals an interactive host may step at.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speed {
    Slow,
    #[default]
    Normal,
    Fast,
    /// No delay between steps.
    Fastest,
}

impl Speed {
    /// The delay between two timer-driven steps.
    pub fn interval(self) -> Duration {
        match self {
            Speed::Slow => Duration::from_millis(1000),
            Speed::Normal => Duration::from_millis(400),
            Speed::Fast => Duration::from_millis(100),
            Speed::Fastest => Duration::ZERO,
        }
    }
}

impl FromStr for Speed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slow" => Ok(Speed::Slow),
            "normal" => Ok(Speed::Normal),
            "fast" => Ok(Speed::Fast),
            "fastest" => Ok(Speed::Fastest),
            other => Err(format!(
                "unknown speed '{other}' (expected slow, normal, fast or fastest)"
            )),
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Speed::Slow => "slow",
            Speed::Normal => "normal",
            Speed::Fast => "fast",
            Speed::Fastest => "fastest",
        };
        write!(f, "{name}")
    }
}

/// Settings for one simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Step ceiling for run-to-halt; `0` means unlimited.
    pub max_steps: usize,
    /// Seed for resolving nondeterministic choices; `None` seeds from system entropy.
    pub seed: Option<u64>,
    /// Interval between steps when stepping on a timer.
    pub speed: Speed,
    /// Log every configuration while running.
    pub verbose: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_steps: MAX_EXECUTION_STEPS,
            seed: None,
            speed: Speed::default(),
            verbose: false,
        }
    }
}

impl RunConfig {
    /// Parses a JSON configuration. Missing fields take their defaults.
    pub fn from_json(content: &str) -> Result<Self, MachineError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Loads a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, MachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            MachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }
}
