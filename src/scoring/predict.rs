use serde::Serialize;

use super::config::ScoringWeights;
use super::engine::{calculate_score, FactorContribution, SubScores};
use crate::race::HorseEntry;

/// Composite scores are divided by this before the softmax
pub const SOFTMAX_TEMPERATURE: f64 = 10.0;

/// One ranked horse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Position of the horse in the input slice
    #[serde(skip)]
    pub entry_index: usize,
    pub horse: String,
    pub score: f64,
    /// Percentage, one decimal; the field sums to 100 within rounding
    pub win_probability: f64,
    /// Softmax probability in [0, 1] before rounding
    pub raw_probability: f64,
    pub sub_scores: SubScores,
    #[serde(skip)]
    pub factors: Vec<FactorContribution>,
}

/// The three headline plays shown under the rankings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BettingPicks<'a> {
    pub favorite: &'a PredictionResult,
    pub value_play: &'a PredictionResult,
    pub longshot: &'a PredictionResult,
}

/// Score every horse, convert the scores into win probabilities and rank
/// them by score, highest first. Equal scores keep their input order.
///
/// Probabilities are only meaningful with two or more horses; an empty
/// field gives an empty ranking.
pub fn predict_race(horses: &[HorseEntry], weights: &ScoringWeights) -> Vec<PredictionResult> {
    let scored: Vec<_> = horses
        .iter()
        .enumerate()
        .map(|(index, horse)| ((index, horse), calculate_score(horse, weights)))
        .collect();

    let scores: Vec<f64> = scored.iter().map(|(_, result)| result.score).collect();
    let probabilities = softmax_probabilities(&scores);
    let percentages = normalize_percentages(&probabilities);

    let mut results: Vec<PredictionResult> = scored
        .into_iter()
        .zip(probabilities)
        .zip(percentages)
        .map(
            |((((entry_index, horse), result), raw_probability), win_probability)| {
                PredictionResult {
                    entry_index,
                    horse: horse.name.clone(),
                    score: result.score,
                    win_probability,
                    raw_probability,
                    sub_scores: result.sub_scores,
                    factors: result.factors,
                }
            },
        )
        .collect();

    // sort_by is stable, so ties stay in entry order
    results.sort_by(|a, b| b.score.total_cmp(&a.score));

    tracing::debug!(
        runners = results.len(),
        favorite = results.first().map(|r| r.horse.as_str()).unwrap_or(""),
        "ranked race"
    );

    results
}

/// `exp(s_i / T) / sum_j exp(s_j / T)`, computed with the top score
/// subtracted so large scores cannot overflow.
pub fn softmax_probabilities(scores: &[f64]) -> Vec<f64> {
    if scores.is_empty() {
        return Vec::new();
    }

    let max_score = scores.iter().copied().fold(f64::MIN, f64::max);
    let exps: Vec<f64> = scores
        .iter()
        .map(|s| ((s - max_score) / SOFTMAX_TEMPERATURE).exp())
        .collect();
    let total: f64 = exps.iter().sum();

    exps.into_iter().map(|e| e / total).collect()
}

/// Probabilities to one-decimal percentages that add up to 100.
///
/// Each percentage is rounded, then the rounded set is rescaled to 100 and
/// rounded again. The sum can still miss 100 by a tenth, and equal
/// probabilities always come out as equal percentages.
pub fn normalize_percentages(probabilities: &[f64]) -> Vec<f64> {
    let rounded: Vec<f64> = probabilities
        .iter()
        .map(|p| round_to(p * 100.0, 1))
        .collect();

    let total: f64 = rounded.iter().sum();
    if total <= 0.0 {
        return rounded;
    }

    rounded
        .into_iter()
        .map(|pct| round_to(pct / total * 100.0, 1))
        .collect()
}

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Favorite is the top pick, value play the runner-up, longshot the bottom
/// of the ranking once there are at least three runners.
pub fn betting_picks(predictions: &[PredictionResult]) -> Option<BettingPicks<'_>> {
    let favorite = predictions.first()?;
    let value_play = predictions.get(1).unwrap_or(favorite);
    let longshot = if predictions.len() >= 3 {
        predictions.last().unwrap_or(favorite)
    } else {
        favorite
    };

    Some(BettingPicks {
        favorite,
        value_play,
        longshot,
    })
}
