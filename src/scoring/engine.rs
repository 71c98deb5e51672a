use serde::Serialize;

use super::config::ScoringWeights;
use super::tables::{
    class_ordinal, large_field_post_advantage, mid_field_post_advantage, track_multiplier,
};
use crate::race::{HorseEntry, DEFAULT_FINISHES};

/// Adjusted speed figures never exceed this
pub const MAX_SPEED_SCORE: f64 = 120.0;

/// Races at or under this distance are sprints and keep the full speed figure
pub const SPRINT_MAX_FURLONGS: f64 = 6.5;
const ROUTE_DISTANCE_FACTOR: f64 = 0.95;

/// Win rate treated as elite for jockeys and trainers
const ELITE_WIN_PCT: f64 = 0.25;
const ELITE_COMBO_WIN_PCT: f64 = 0.30;
const MAX_COMBO_BONUS: f64 = 0.2;

/// Fields this small make the draw irrelevant
const SMALL_FIELD_MAX: u32 = 6;
const MID_FIELD_MAX: u32 = 10;

/// Non-speed sub-scores are on a 0-1ish scale; this puts them on speed's scale
const SUB_SCORE_SCALE: f64 = 100.0;

/// The six sub-scores behind a composite score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubScores {
    pub speed: f64,
    pub form: f64,
    pub class: f64,
    pub jockey: f64,
    pub trainer: f64,
    pub post: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FactorContribution {
    pub label: &'static str, // e.g. "Speed", "Form"
    pub raw: f64,            // Sub-score before weighting
    pub weight: f64,
    pub points: f64,         // What this factor adds to the composite
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub score: f64,
    pub sub_scores: SubScores,
    pub factors: Vec<FactorContribution>,
}

/// Adjusted speed figure: base figure scaled for the going, the trip and the
/// horse's recent trend, capped at `MAX_SPEED_SCORE`.
pub fn calculate_speed_score(horse: &HorseEntry) -> f64 {
    let track = track_multiplier(horse.track_condition);
    let distance = if horse.race_distance_furlongs <= SPRINT_MAX_FURLONGS {
        1.0
    } else {
        ROUTE_DISTANCE_FACTOR
    };
    let trend = trend_factor(&horse.recent_speed_figures);

    (horse.speed_figure as f64 * track * distance * trend).min(MAX_SPEED_SCORE)
}

/// Half the relative change between the latest figure and the one two races
/// before it. Neutral with fewer than three figures.
fn trend_factor(figures: &[u32]) -> f64 {
    if figures.len() < 3 {
        return 1.0;
    }
    let latest = figures[figures.len() - 1] as f64;
    let third_from_last = figures[figures.len() - 3];
    // A zero figure would divide by zero; floor the denominator at 1
    let denominator = third_from_last.max(1) as f64;
    let trend = (latest - third_from_last as f64) / denominator;
    1.0 + trend * 0.5
}

/// Weighted average of recent finishing positions, in [0, 1].
///
/// Finishes are walked newest first; the i-th (0-based) gets weight
/// `(i + 1) / n`. Each finish scores `(10 - pos) / 10`, so anything outside
/// the top nine scores zero. No history counts as three mid-pack runs.
pub fn calculate_form_score(horse: &HorseEntry) -> f64 {
    let finishes: &[u32] = if horse.recent_finishes.is_empty() {
        &DEFAULT_FINISHES
    } else {
        &horse.recent_finishes
    };

    let total_races = finishes.len() as f64;
    if finishes.is_empty() {
        return 0.5;
    }

    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    for (i, &finish) in finishes.iter().rev().enumerate() {
        let weight = (i + 1) as f64 / total_races;
        let position_score = ((10.0 - finish as f64) / 10.0).max(0.0);
        weighted_sum += position_score * weight;
        total_weight += weight;
    }

    if total_weight > 0.0 {
        (weighted_sum / total_weight).clamp(0.0, 1.0)
    } else {
        0.5
    }
}

/// 1.2 for a class dropper, 1.0 at its level, 0.8 when stepping up
pub fn calculate_class_score(horse: &HorseEntry) -> f64 {
    let race_level = class_ordinal(horse.race_class);
    let horse_level = class_ordinal(horse.horse_class);

    match horse_level.cmp(&race_level) {
        std::cmp::Ordering::Greater => 1.2,
        std::cmp::Ordering::Equal => 1.0,
        std::cmp::Ordering::Less => 0.8,
    }
}

/// (jockey, trainer) scores. Win rates are normalized against a 25% elite
/// rate; both share half of a small bonus for a proven pairing.
pub fn calculate_connection_scores(horse: &HorseEntry) -> (f64, f64) {
    let combo_bonus =
        (horse.jockey_trainer_combo_win_pct / ELITE_COMBO_WIN_PCT).min(MAX_COMBO_BONUS);
    let jockey = (horse.jockey_win_pct / ELITE_WIN_PCT).min(1.0);
    let trainer = (horse.trainer_win_pct / ELITE_WIN_PCT).min(1.0);

    (jockey + combo_bonus * 0.5, trainer + combo_bonus * 0.5)
}

pub fn calculate_post_position_score(horse: &HorseEntry) -> f64 {
    if horse.field_size <= SMALL_FIELD_MAX {
        1.0
    } else if horse.field_size <= MID_FIELD_MAX {
        mid_field_post_advantage(horse.post_position)
    } else {
        large_field_post_advantage(horse.post_position)
    }
}

/// Score one horse: every sub-score once, then the weighted composite.
pub fn calculate_score(horse: &HorseEntry, weights: &ScoringWeights) -> ScoreResult {
    let (jockey, trainer) = calculate_connection_scores(horse);
    let sub_scores = SubScores {
        speed: calculate_speed_score(horse),
        form: calculate_form_score(horse),
        class: calculate_class_score(horse),
        jockey,
        trainer,
        post: calculate_post_position_score(horse),
    };

    let factors = vec![
        contribution("Speed", sub_scores.speed, weights.speed, 1.0),
        contribution("Form", sub_scores.form, weights.form, SUB_SCORE_SCALE),
        contribution("Class", sub_scores.class, weights.class, SUB_SCORE_SCALE),
        contribution("Jockey", sub_scores.jockey, weights.jockey, SUB_SCORE_SCALE),
        contribution("Trainer", sub_scores.trainer, weights.trainer, SUB_SCORE_SCALE),
        contribution("Post", sub_scores.post, weights.post, SUB_SCORE_SCALE),
    ];
    let score = factors.iter().map(|f| f.points).sum();

    tracing::debug!(
        horse = %horse.name,
        score,
        speed = sub_scores.speed,
        form = sub_scores.form,
        class = sub_scores.class,
        jockey = sub_scores.jockey,
        trainer = sub_scores.trainer,
        post = sub_scores.post,
        "scored entry"
    );

    ScoreResult {
        score,
        sub_scores,
        factors,
    }
}

pub fn calculate_overall_score(horse: &HorseEntry, weights: &ScoringWeights) -> f64 {
    calculate_score(horse, weights).score
}

fn contribution(label: &'static str, raw: f64, weight: f64, scale: f64) -> FactorContribution {
    FactorContribution {
        label,
        raw,
        weight,
        points: raw * scale * weight,
    }
}
