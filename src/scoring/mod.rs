pub mod config;
pub mod engine;
pub mod predict;
pub mod tables;
pub mod validation;

pub use config::ScoringWeights;
pub use engine::{
    calculate_class_score, calculate_connection_scores, calculate_form_score,
    calculate_overall_score, calculate_post_position_score, calculate_score,
    calculate_speed_score, FactorContribution, ScoreResult, SubScores, MAX_SPEED_SCORE,
};
pub use predict::{
    betting_picks, normalize_percentages, predict_race, round_to, softmax_probabilities,
    BettingPicks, PredictionResult,
};
pub use validation::validate_weights;
