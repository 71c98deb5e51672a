use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::card::RaceSetup;
use super::types::{HorseEntry, RaceClass, TrackCondition};

/// Horses with no finishes on record are treated as mid-pack runners.
pub const DEFAULT_FINISHES: [u32; 3] = [5, 5, 5];

/// Why a raw entry could not become a `HorseEntry`.
///
/// Every variant names the offending field so the caller can point at it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntryError {
    #[error("{field}: required field is missing")]
    MissingField { field: String },

    #[error("{field}: cannot parse '{value}' ({reason})")]
    Parse {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{field}: {value} is out of range (expected {expected})")]
    OutOfRange {
        field: String,
        value: String,
        expected: &'static str,
    },
}

impl EntryError {
    pub fn field(&self) -> &str {
        match self {
            EntryError::MissingField { field }
            | EntryError::Parse { field, .. }
            | EntryError::OutOfRange { field, .. } => field,
        }
    }
}

fn missing(field: &str) -> EntryError {
    EntryError::MissingField {
        field: field.to_string(),
    }
}

/// A horse as written in a race card file. Every field is optional here;
/// `into_entry` decides what is required.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EntryRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub speed_figure: Option<u32>,
    #[serde(default)]
    pub recent_speed_figures: Option<Vec<u32>>,
    #[serde(default)]
    pub recent_finishes: Option<Vec<u32>>,
    #[serde(default)]
    pub race_class: Option<RaceClass>,
    #[serde(default)]
    pub horse_class: Option<RaceClass>,
    #[serde(default)]
    pub jockey_win_pct: Option<f64>,
    #[serde(default)]
    pub trainer_win_pct: Option<f64>,
    #[serde(default)]
    pub jockey_trainer_combo_win_pct: Option<f64>,
    #[serde(default)]
    pub post_position: Option<u32>,
    #[serde(default)]
    pub field_size: Option<u32>,
    #[serde(default)]
    pub race_distance_furlongs: Option<f64>,
    #[serde(default)]
    pub track_condition: Option<TrackCondition>,
}

impl EntryRecord {
    /// Validate the record, filling race-level fields from `setup` when the
    /// record leaves them out.
    pub fn into_entry(self, setup: &RaceSetup) -> Result<HorseEntry, EntryError> {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| missing("name"))?;

        let speed_figure = self.speed_figure.ok_or_else(|| missing("speed_figure"))?;

        let recent_finishes = self.recent_finishes.unwrap_or_default();
        if let Some(bad) = recent_finishes.iter().find(|&&f| f == 0) {
            return Err(EntryError::OutOfRange {
                field: "recent_finishes".to_string(),
                value: bad.to_string(),
                expected: "finishing positions of 1 or more",
            });
        }

        let race_class = self
            .race_class
            .or(setup.class)
            .ok_or_else(|| missing("race_class"))?;
        let horse_class = self.horse_class.ok_or_else(|| missing("horse_class"))?;

        let jockey_win_pct = fraction("jockey_win_pct", self.jockey_win_pct)?;
        let trainer_win_pct = fraction("trainer_win_pct", self.trainer_win_pct)?;
        let jockey_trainer_combo_win_pct = fraction(
            "jockey_trainer_combo_win_pct",
            self.jockey_trainer_combo_win_pct,
        )?;

        let post_position = at_least_one("post_position", self.post_position)?;
        let field_size = at_least_one("field_size", self.field_size.or(setup.field_size))?;

        let race_distance_furlongs = self
            .race_distance_furlongs
            .or(setup.distance_furlongs)
            .ok_or_else(|| missing("race_distance_furlongs"))?;
        if !race_distance_furlongs.is_finite() || race_distance_furlongs < 0.0 {
            return Err(EntryError::OutOfRange {
                field: "race_distance_furlongs".to_string(),
                value: race_distance_furlongs.to_string(),
                expected: "a non-negative distance",
            });
        }

        let track_condition = self
            .track_condition
            .or(setup.track_condition)
            .ok_or_else(|| missing("track_condition"))?;

        Ok(HorseEntry {
            name,
            speed_figure,
            recent_speed_figures: self.recent_speed_figures.unwrap_or_default(),
            recent_finishes,
            race_class,
            horse_class,
            jockey_win_pct,
            trainer_win_pct,
            jockey_trainer_combo_win_pct,
            post_position,
            field_size,
            race_distance_furlongs,
            track_condition,
        })
    }
}

fn fraction(field: &str, value: Option<f64>) -> Result<f64, EntryError> {
    let value = value.ok_or_else(|| missing(field))?;
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(EntryError::OutOfRange {
            field: field.to_string(),
            value: value.to_string(),
            expected: "a fraction between 0 and 1",
        })
    }
}

fn at_least_one(field: &str, value: Option<u32>) -> Result<u32, EntryError> {
    match value {
        None => Err(missing(field)),
        Some(0) => Err(EntryError::OutOfRange {
            field: field.to_string(),
            value: "0".to_string(),
            expected: "1 or more",
        }),
        Some(v) => Ok(v),
    }
}

/// Parse a comma-separated list of non-negative integers ("82, 84,85").
/// An empty or all-whitespace string is an empty list.
pub fn parse_int_list(field: &str, raw: &str) -> Result<Vec<u32>, EntryError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    raw.split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<u32>().map_err(|e| EntryError::Parse {
                field: field.to_string(),
                value: part.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Fields of the interactive add-horse form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    SpeedFigure,
    RecentSpeedFigures,
    RecentFinishes,
    RaceClass,
    HorseClass,
    PostPosition,
    JockeyWinPct,
    TrainerWinPct,
    ComboWinPct,
    FieldSize,
    Distance,
    TrackCondition,
}

impl FormField {
    pub const ALL: [FormField; 13] = [
        FormField::Name,
        FormField::SpeedFigure,
        FormField::RecentSpeedFigures,
        FormField::RecentFinishes,
        FormField::RaceClass,
        FormField::HorseClass,
        FormField::PostPosition,
        FormField::JockeyWinPct,
        FormField::TrainerWinPct,
        FormField::ComboWinPct,
        FormField::FieldSize,
        FormField::Distance,
        FormField::TrackCondition,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Horse Name",
            FormField::SpeedFigure => "Beyer Speed Figure",
            FormField::RecentSpeedFigures => "Recent Beyer Figures",
            FormField::RecentFinishes => "Recent Finishes",
            FormField::RaceClass => "Race Class",
            FormField::HorseClass => "Horse Class",
            FormField::PostPosition => "Post Position",
            FormField::JockeyWinPct => "Jockey Win %",
            FormField::TrainerWinPct => "Trainer Win %",
            FormField::ComboWinPct => "Jockey-Trainer Combo Win %",
            FormField::FieldSize => "Field Size",
            FormField::Distance => "Distance (furlongs)",
            FormField::TrackCondition => "Track Condition",
        }
    }

    /// Field name used in validation errors
    pub fn key(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::SpeedFigure => "speed_figure",
            FormField::RecentSpeedFigures => "recent_speed_figures",
            FormField::RecentFinishes => "recent_finishes",
            FormField::RaceClass => "race_class",
            FormField::HorseClass => "horse_class",
            FormField::PostPosition => "post_position",
            FormField::JockeyWinPct => "jockey_win_pct",
            FormField::TrainerWinPct => "trainer_win_pct",
            FormField::ComboWinPct => "jockey_trainer_combo_win_pct",
            FormField::FieldSize => "field_size",
            FormField::Distance => "race_distance_furlongs",
            FormField::TrackCondition => "track_condition",
        }
    }

    pub fn from_key(key: &str) -> Option<FormField> {
        FormField::ALL.iter().copied().find(|f| f.key() == key)
    }
}

/// Raw text of the add-horse form. Percentages are typed as 0-100.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryForm {
    pub name: String,
    pub speed_figure: String,
    pub recent_speed_figures: String,
    pub recent_finishes: String,
    pub race_class: String,
    pub horse_class: String,
    pub post_position: String,
    pub jockey_win_pct: String,
    pub trainer_win_pct: String,
    pub combo_win_pct: String,
    pub field_size: String,
    pub distance: String,
    pub track_condition: String,
}

impl EntryForm {
    /// A form prefilled the way a fresh "Add Horse" panel opens, with the
    /// race-level fields taken from `setup` where it has them.
    pub fn with_defaults(setup: &RaceSetup) -> Self {
        Self {
            name: String::new(),
            speed_figure: "85".to_string(),
            recent_speed_figures: "82,84,85".to_string(),
            recent_finishes: "2,1,3".to_string(),
            race_class: setup
                .class
                .unwrap_or(RaceClass::Maiden)
                .label()
                .to_string(),
            horse_class: RaceClass::Maiden.label().to_string(),
            post_position: "1".to_string(),
            jockey_win_pct: "12.0".to_string(),
            trainer_win_pct: "15.0".to_string(),
            combo_win_pct: "20.0".to_string(),
            field_size: setup.field_size.unwrap_or(8).to_string(),
            distance: setup.distance_furlongs.unwrap_or(8.5).to_string(),
            track_condition: setup
                .track_condition
                .unwrap_or(TrackCondition::Fast)
                .label()
                .to_string(),
        }
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::SpeedFigure => &self.speed_figure,
            FormField::RecentSpeedFigures => &self.recent_speed_figures,
            FormField::RecentFinishes => &self.recent_finishes,
            FormField::RaceClass => &self.race_class,
            FormField::HorseClass => &self.horse_class,
            FormField::PostPosition => &self.post_position,
            FormField::JockeyWinPct => &self.jockey_win_pct,
            FormField::TrainerWinPct => &self.trainer_win_pct,
            FormField::ComboWinPct => &self.combo_win_pct,
            FormField::FieldSize => &self.field_size,
            FormField::Distance => &self.distance,
            FormField::TrackCondition => &self.track_condition,
        }
    }

    pub fn get_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::SpeedFigure => &mut self.speed_figure,
            FormField::RecentSpeedFigures => &mut self.recent_speed_figures,
            FormField::RecentFinishes => &mut self.recent_finishes,
            FormField::RaceClass => &mut self.race_class,
            FormField::HorseClass => &mut self.horse_class,
            FormField::PostPosition => &mut self.post_position,
            FormField::JockeyWinPct => &mut self.jockey_win_pct,
            FormField::TrainerWinPct => &mut self.trainer_win_pct,
            FormField::ComboWinPct => &mut self.combo_win_pct,
            FormField::FieldSize => &mut self.field_size,
            FormField::Distance => &mut self.distance,
            FormField::TrackCondition => &mut self.track_condition,
        }
    }

    /// Parse the raw text into an `EntryRecord`. Blank scalar fields stay
    /// `None` so that `into_entry` reports them as missing.
    pub fn to_record(&self) -> Result<EntryRecord, EntryError> {
        Ok(EntryRecord {
            name: non_blank(&self.name).map(str::to_string),
            speed_figure: parse_opt(FormField::SpeedFigure, &self.speed_figure)?,
            recent_speed_figures: Some(parse_int_list(
                FormField::RecentSpeedFigures.key(),
                &self.recent_speed_figures,
            )?),
            recent_finishes: Some(parse_int_list(
                FormField::RecentFinishes.key(),
                &self.recent_finishes,
            )?),
            race_class: parse_opt(FormField::RaceClass, &self.race_class)?,
            horse_class: parse_opt(FormField::HorseClass, &self.horse_class)?,
            jockey_win_pct: parse_percent(FormField::JockeyWinPct, &self.jockey_win_pct)?,
            trainer_win_pct: parse_percent(FormField::TrainerWinPct, &self.trainer_win_pct)?,
            jockey_trainer_combo_win_pct: parse_percent(
                FormField::ComboWinPct,
                &self.combo_win_pct,
            )?,
            post_position: parse_opt(FormField::PostPosition, &self.post_position)?,
            field_size: parse_opt(FormField::FieldSize, &self.field_size)?,
            race_distance_furlongs: parse_opt(FormField::Distance, &self.distance)?,
            track_condition: parse_opt(FormField::TrackCondition, &self.track_condition)?,
        })
    }

    /// Parse and validate the form into a scoring-ready entry. Blank
    /// race-level fields fall back to `setup`.
    pub fn parse(&self, setup: &RaceSetup) -> Result<HorseEntry, EntryError> {
        self.to_record()?.into_entry(setup)
    }
}

fn non_blank(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_opt<T>(field: FormField, raw: &str) -> Result<Option<T>, EntryError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match non_blank(raw) {
        None => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(|e| EntryError::Parse {
            field: field.key().to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// "12.5" or "12.5%" -> 0.125
fn parse_percent(field: FormField, raw: &str) -> Result<Option<f64>, EntryError> {
    let stripped = raw.trim().trim_end_matches('%');
    let Some(pct) = parse_opt::<f64>(field, stripped)? else {
        return Ok(None);
    };
    if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
        return Err(EntryError::OutOfRange {
            field: field.key().to_string(),
            value: raw.trim().to_string(),
            expected: "a percentage between 0 and 100",
        });
    }
    Ok(Some(pct / 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_record() -> EntryRecord {
        EntryRecord {
            name: Some("Secretariat".to_string()),
            speed_figure: Some(85),
            recent_speed_figures: Some(vec![82, 84, 85]),
            recent_finishes: Some(vec![2, 1, 3]),
            race_class: Some(RaceClass::Allowance),
            horse_class: Some(RaceClass::Stakes),
            jockey_win_pct: Some(0.12),
            trainer_win_pct: Some(0.15),
            jockey_trainer_combo_win_pct: Some(0.20),
            post_position: Some(3),
            field_size: Some(8),
            race_distance_furlongs: Some(8.5),
            track_condition: Some(TrackCondition::Fast),
        }
    }

    #[test]
    fn test_full_record_converts() {
        let entry = full_record().into_entry(&RaceSetup::default()).unwrap();
        assert_eq!(entry.name, "Secretariat");
        assert_eq!(entry.recent_finishes, vec![2, 1, 3]);
        assert_eq!(entry.horse_class, RaceClass::Stakes);
    }

    #[test]
    fn test_missing_field_is_named() {
        let mut record = full_record();
        record.speed_figure = None;
        let err = record.into_entry(&RaceSetup::default()).unwrap_err();
        assert_eq!(err, missing("speed_figure"));
        assert!(err.to_string().contains("speed_figure"));
    }

    #[test]
    fn test_blank_name_is_missing() {
        let mut record = full_record();
        record.name = Some("   ".to_string());
        let err = record.into_entry(&RaceSetup::default()).unwrap_err();
        assert_eq!(err.field(), "name");
    }

    #[test]
    fn test_race_fields_fall_back_to_setup() {
        let mut record = full_record();
        record.race_class = None;
        record.field_size = None;
        record.race_distance_furlongs = None;
        record.track_condition = None;

        let setup = RaceSetup {
            class: Some(RaceClass::Stakes),
            distance_furlongs: Some(6.0),
            track_condition: Some(TrackCondition::Muddy),
            field_size: Some(12),
            ..RaceSetup::default()
        };
        let entry = record.into_entry(&setup).unwrap();
        assert_eq!(entry.race_class, RaceClass::Stakes);
        assert_eq!(entry.field_size, 12);
        assert_eq!(entry.race_distance_furlongs, 6.0);
        assert_eq!(entry.track_condition, TrackCondition::Muddy);
    }

    #[test]
    fn test_record_value_wins_over_setup() {
        let setup = RaceSetup {
            field_size: Some(12),
            ..RaceSetup::default()
        };
        let entry = full_record().into_entry(&setup).unwrap();
        assert_eq!(entry.field_size, 8);
    }

    #[test]
    fn test_missing_race_field_without_setup() {
        let mut record = full_record();
        record.track_condition = None;
        let err = record.into_entry(&RaceSetup::default()).unwrap_err();
        assert_eq!(err.field(), "track_condition");
    }

    #[test]
    fn test_percentage_out_of_range() {
        let mut record = full_record();
        record.jockey_win_pct = Some(1.5);
        let err = record.into_entry(&RaceSetup::default()).unwrap_err();
        assert!(matches!(err, EntryError::OutOfRange { ref field, .. } if field == "jockey_win_pct"));
    }

    #[test]
    fn test_nan_percentage_rejected() {
        let mut record = full_record();
        record.trainer_win_pct = Some(f64::NAN);
        assert!(record.into_entry(&RaceSetup::default()).is_err());
    }

    #[test]
    fn test_zero_post_and_finish_rejected() {
        let mut record = full_record();
        record.post_position = Some(0);
        assert_eq!(
            record.into_entry(&RaceSetup::default()).unwrap_err().field(),
            "post_position"
        );

        let mut record = full_record();
        record.recent_finishes = Some(vec![1, 0]);
        assert_eq!(
            record.into_entry(&RaceSetup::default()).unwrap_err().field(),
            "recent_finishes"
        );
    }

    #[test]
    fn test_negative_distance_rejected() {
        let mut record = full_record();
        record.race_distance_furlongs = Some(-1.0);
        assert_eq!(
            record.into_entry(&RaceSetup::default()).unwrap_err().field(),
            "race_distance_furlongs"
        );
    }

    #[test]
    fn test_empty_lists_allowed() {
        let mut record = full_record();
        record.recent_finishes = None;
        record.recent_speed_figures = None;
        let entry = record.into_entry(&RaceSetup::default()).unwrap();
        assert!(entry.recent_finishes.is_empty());
        assert!(entry.recent_speed_figures.is_empty());
    }

    #[test]
    fn test_parse_int_list() {
        assert_eq!(parse_int_list("f", "82, 84 ,85").unwrap(), vec![82, 84, 85]);
        assert_eq!(parse_int_list("f", "  ").unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn test_parse_int_list_reports_bad_item() {
        let err = parse_int_list("recent_finishes", "2,x,3").unwrap_err();
        match err {
            EntryError::Parse { field, value, .. } => {
                assert_eq!(field, "recent_finishes");
                assert_eq!(value, "x");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_default_form_parses() {
        let mut form = EntryForm::with_defaults(&RaceSetup::default());
        form.name = "Seabiscuit".to_string();
        let entry = form.parse(&RaceSetup::default()).unwrap();
        assert_eq!(entry.speed_figure, 85);
        assert_eq!(entry.recent_speed_figures, vec![82, 84, 85]);
        assert_eq!(entry.race_class, RaceClass::Maiden);
        assert_eq!(entry.track_condition, TrackCondition::Fast);
        assert_eq!(entry.field_size, 8);
        assert!((entry.jockey_win_pct - 0.12).abs() < 1e-12);
        assert!((entry.jockey_trainer_combo_win_pct - 0.20).abs() < 1e-12);
    }

    #[test]
    fn test_form_requires_name() {
        let form = EntryForm::with_defaults(&RaceSetup::default());
        assert_eq!(form.parse(&RaceSetup::default()).unwrap_err().field(), "name");
    }

    #[test]
    fn test_form_accepts_labels_and_percent_sign() {
        let mut form = EntryForm::with_defaults(&RaceSetup::default());
        form.name = "Zenyatta".to_string();
        form.horse_class = "Graded Stakes".to_string();
        form.track_condition = "Turf-Good".to_string();
        form.trainer_win_pct = "25%".to_string();
        let entry = form.parse(&RaceSetup::default()).unwrap();
        assert_eq!(entry.horse_class, RaceClass::GradedStakes);
        assert_eq!(entry.track_condition, TrackCondition::TurfGood);
        assert!((entry.trainer_win_pct - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_form_rejects_bad_values() {
        let mut form = EntryForm::with_defaults(&RaceSetup::default());
        form.name = "Zenyatta".to_string();
        form.speed_figure = "fast".to_string();
        assert!(matches!(form.parse(&RaceSetup::default()), Err(EntryError::Parse { ref field, .. }) if field == "speed_figure"));

        form.speed_figure = "90".to_string();
        form.jockey_win_pct = "120".to_string();
        assert!(matches!(form.parse(&RaceSetup::default()), Err(EntryError::OutOfRange { ref field, .. }) if field == "jockey_win_pct"));

        form.jockey_win_pct = "12".to_string();
        form.race_class = "handicap".to_string();
        assert_eq!(form.parse(&RaceSetup::default()).unwrap_err().field(), "race_class");
    }

    #[test]
    fn test_form_uses_setup_defaults() {
        let setup = RaceSetup {
            distance_furlongs: Some(6.0),
            field_size: Some(12),
            track_condition: Some(TrackCondition::Sloppy),
            class: Some(RaceClass::Stakes),
            ..RaceSetup::default()
        };
        let form = EntryForm::with_defaults(&setup);
        assert_eq!(form.distance, "6");
        assert_eq!(form.field_size, "12");
        assert_eq!(form.track_condition, "Sloppy");
        assert_eq!(form.race_class, "Stakes");
    }

    #[test]
    fn test_form_field_keys_roundtrip() {
        for field in FormField::ALL {
            assert_eq!(FormField::from_key(field.key()), Some(field));
        }
    }

    #[test]
    fn test_record_yaml_rejects_unknown_keys() {
        let yaml = "name: Foo\nspeed: 90\n";
        assert!(serde_saphyr::from_str::<EntryRecord>(yaml).is_err());
    }
}
