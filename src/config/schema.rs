use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::race::RaceSetup;
use crate::scoring::ScoringWeights;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Weight overrides; missing keys keep the defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring: Option<ScoringWeights>,

    #[serde(default)]
    pub theme: ThemeMode,

    /// Where exported CSV files land (default: current directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,

    /// Race-level defaults for new entries
    #[serde(default)]
    pub race: RaceSetup,
}

impl Config {
    pub fn effective_weights(&self) -> ScoringWeights {
        self.scoring.clone().unwrap_or_default()
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Auto,
    Dark,
    Light,
}
