use serde::{Deserialize, Serialize};

/// Weights of the sub-scores in the composite score.
///
/// Speed is weighted on its raw 0-120 scale; every other sub-score is
/// rescaled by 100 before weighting so the terms are comparable. Keys left
/// out of the config keep their defaults.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   speed: 0.30
///   form: 0.20
///   post: 0.05
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ScoringWeights {
    pub speed: f64,
    pub form: f64,
    pub class: f64,
    pub jockey: f64,
    pub trainer: f64,
    pub post: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            speed: 0.25,
            form: 0.20,
            class: 0.15,
            jockey: 0.12,
            trainer: 0.12,
            post: 0.08,
        }
    }
}

impl ScoringWeights {
    /// (config key, weight) pairs in display order
    pub fn entries(&self) -> [(&'static str, f64); 6] {
        [
            ("speed", self.speed),
            ("form", self.form),
            ("class", self.class),
            ("jockey", self.jockey),
            ("trainer", self.trainer),
            ("post", self.post),
        ]
    }

    pub fn total(&self) -> f64 {
        self.entries().iter().map(|(_, w)| w).sum()
    }
}
