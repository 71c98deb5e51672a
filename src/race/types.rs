use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Competitive tier of a race or a horse, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceClass {
    Maiden,
    Claiming,
    Allowance,
    Stakes,
    GradedStakes,
    #[serde(rename = "grade_1")]
    Grade1,
}

impl RaceClass {
    pub const ALL: [RaceClass; 6] = [
        RaceClass::Maiden,
        RaceClass::Claiming,
        RaceClass::Allowance,
        RaceClass::Stakes,
        RaceClass::GradedStakes,
        RaceClass::Grade1,
    ];

    /// Label as shown in the entry form ("Graded Stakes")
    pub fn label(&self) -> &'static str {
        match self {
            RaceClass::Maiden => "Maiden",
            RaceClass::Claiming => "Claiming",
            RaceClass::Allowance => "Allowance",
            RaceClass::Stakes => "Stakes",
            RaceClass::GradedStakes => "Graded Stakes",
            RaceClass::Grade1 => "Grade 1",
        }
    }

    /// Machine key as used in race card files ("graded_stakes")
    pub fn key(&self) -> &'static str {
        match self {
            RaceClass::Maiden => "maiden",
            RaceClass::Claiming => "claiming",
            RaceClass::Allowance => "allowance",
            RaceClass::Stakes => "stakes",
            RaceClass::GradedStakes => "graded_stakes",
            RaceClass::Grade1 => "grade_1",
        }
    }
}

impl fmt::Display for RaceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RaceClass {
    type Err = String;

    /// Accepts keys and form labels alike: "graded_stakes", "Graded Stakes", "grade-1"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_label(s);
        RaceClass::ALL
            .iter()
            .copied()
            .find(|class| class.key() == key)
            .ok_or_else(|| {
                format!(
                    "unknown class '{}' (expected one of: {})",
                    s.trim(),
                    RaceClass::ALL.map(|c| c.key()).join(", ")
                )
            })
    }
}

/// Going / surface condition of the track on race day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackCondition {
    Fast,
    Good,
    Sloppy,
    Muddy,
    TurfFirm,
    TurfGood,
}

impl TrackCondition {
    pub const ALL: [TrackCondition; 6] = [
        TrackCondition::Fast,
        TrackCondition::Good,
        TrackCondition::Sloppy,
        TrackCondition::Muddy,
        TrackCondition::TurfFirm,
        TrackCondition::TurfGood,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TrackCondition::Fast => "Fast",
            TrackCondition::Good => "Good",
            TrackCondition::Sloppy => "Sloppy",
            TrackCondition::Muddy => "Muddy",
            TrackCondition::TurfFirm => "Turf-Firm",
            TrackCondition::TurfGood => "Turf-Good",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            TrackCondition::Fast => "fast",
            TrackCondition::Good => "good",
            TrackCondition::Sloppy => "sloppy",
            TrackCondition::Muddy => "muddy",
            TrackCondition::TurfFirm => "turf_firm",
            TrackCondition::TurfGood => "turf_good",
        }
    }
}

impl fmt::Display for TrackCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TrackCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_label(s);
        TrackCondition::ALL
            .iter()
            .copied()
            .find(|condition| condition.key() == key)
            .ok_or_else(|| {
                format!(
                    "unknown track condition '{}' (expected one of: {})",
                    s.trim(),
                    TrackCondition::ALL.map(|c| c.key()).join(", ")
                )
            })
    }
}

/// Lowercase, and fold spaces and dashes into underscores
fn normalize_label(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// A validated horse record, ready for scoring.
///
/// Race-level fields (class, distance, condition, field size) are captured
/// per entry so a card can mix entries added under different setups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HorseEntry {
    pub name: String,
    pub speed_figure: u32,
    /// Oldest first
    pub recent_speed_figures: Vec<u32>,
    /// Oldest first, 1 = win
    pub recent_finishes: Vec<u32>,
    pub race_class: RaceClass,
    pub horse_class: RaceClass,
    pub jockey_win_pct: f64,
    pub trainer_win_pct: f64,
    pub jockey_trainer_combo_win_pct: f64,
    pub post_position: u32,
    pub field_size: u32,
    pub race_distance_furlongs: f64,
    pub track_condition: TrackCondition,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_ordering() {
        assert!(RaceClass::Maiden < RaceClass::Claiming);
        assert!(RaceClass::GradedStakes < RaceClass::Grade1);
    }

    #[test]
    fn test_class_parse_accepts_form_labels() {
        assert_eq!("Graded Stakes".parse::<RaceClass>(), Ok(RaceClass::GradedStakes));
        assert_eq!("grade-1".parse::<RaceClass>(), Ok(RaceClass::Grade1));
        assert_eq!("  CLAIMING ".parse::<RaceClass>(), Ok(RaceClass::Claiming));
    }

    #[test]
    fn test_class_parse_rejects_unknown() {
        let err = "handicap".parse::<RaceClass>().unwrap_err();
        assert!(err.contains("handicap"));
        assert!(err.contains("graded_stakes"));
    }

    #[test]
    fn test_track_condition_parse() {
        assert_eq!("Turf-Firm".parse::<TrackCondition>(), Ok(TrackCondition::TurfFirm));
        assert_eq!("sloppy".parse::<TrackCondition>(), Ok(TrackCondition::Sloppy));
        assert!("frozen".parse::<TrackCondition>().is_err());
    }

    #[test]
    fn test_serde_keys() {
        let class: RaceClass = serde_saphyr::from_str("grade_1").unwrap();
        assert_eq!(class, RaceClass::Grade1);
        let condition: TrackCondition = serde_saphyr::from_str("turf_good").unwrap();
        assert_eq!(condition, TrackCondition::TurfGood);
    }
}
