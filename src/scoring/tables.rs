//! Fixed lookup tables used by the sub-scores.
//!
//! The enumerations are closed, so the only unmapped inputs are post
//! positions outside a table's range; those take the documented default.

use crate::race::{RaceClass, TrackCondition};

/// Post advantage for an unmapped post in a 7-10 horse field
pub const MID_FIELD_DEFAULT_POST: f64 = 0.90;

/// Post advantage for a post beyond 20 in a field of more than 10
pub const LARGE_FIELD_DEFAULT_POST: f64 = 0.60;

/// Speed-figure multiplier for the going
pub fn track_multiplier(condition: TrackCondition) -> f64 {
    match condition {
        TrackCondition::Fast => 1.00,
        TrackCondition::Good => 1.02,
        TrackCondition::Sloppy => 1.05,
        TrackCondition::Muddy => 1.08,
        TrackCondition::TurfFirm => 0.98,
        TrackCondition::TurfGood => 1.00,
    }
}

/// Ordinal rank, maiden = 1 through grade 1 = 6
pub fn class_ordinal(class: RaceClass) -> u8 {
    match class {
        RaceClass::Maiden => 1,
        RaceClass::Claiming => 2,
        RaceClass::Allowance => 3,
        RaceClass::Stakes => 4,
        RaceClass::GradedStakes => 5,
        RaceClass::Grade1 => 6,
    }
}

/// Post advantage in a 7-10 horse field. Post 6 is the sweet spot.
pub fn mid_field_post_advantage(post: u32) -> f64 {
    match post {
        1 => 0.85,
        2 => 0.90,
        3 => 0.92,
        4 => 0.95,
        5 => 0.97,
        6 => 1.00,
        7 => 0.98,
        8 => 0.95,
        9 => 0.92,
        10 => 0.90,
        11 => 0.85,
        12 => 0.80,
        13 => 0.75,
        14 => 0.70,
        15 => 0.65,
        _ => MID_FIELD_DEFAULT_POST,
    }
}

/// Post advantage in a field of more than 10: drops 0.05 per stall past 6,
/// floored at 0.5, for posts 1-20.
pub fn large_field_post_advantage(post: u32) -> f64 {
    match post {
        1..=20 => (1.0 - (post as f64 - 6.0) * 0.05).max(0.5),
        _ => LARGE_FIELD_DEFAULT_POST,
    }
}
