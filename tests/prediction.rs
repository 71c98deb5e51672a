//! End-to-end: race card file -> rankings -> CSV

use std::env;
use std::fs;

use furlong::output::{export_csv, format_csv, CSV_HEADER};
use furlong::race::{load_race_card, RaceSetup, TrackCondition};
use furlong::scoring::{
    betting_picks, normalize_percentages, predict_race, softmax_probabilities, ScoringWeights,
};

const CARD: &str = r#"
race:
  name: Saturday Feature
  track: Virtual Downs
  class: allowance
  distance_furlongs: 8.5
  field_size: 5
horses:
  - name: Secretariat
    speed_figure: 92
    recent_speed_figures: [88, 90, 92]
    recent_finishes: [2, 1, 1]
    horse_class: stakes
    jockey_win_pct: 0.18
    trainer_win_pct: 0.21
    jockey_trainer_combo_win_pct: 0.25
    post_position: 4
  - name: Steady Eddie
    speed_figure: 85
    recent_speed_figures: [82, 84, 85]
    recent_finishes: [2, 1, 3]
    horse_class: allowance
    jockey_win_pct: 0.12
    trainer_win_pct: 0.15
    jockey_trainer_combo_win_pct: 0.20
    post_position: 2
  - name: Mud Lark
    speed_figure: 78
    horse_class: claiming
    jockey_win_pct: 0.08
    trainer_win_pct: 0.10
    jockey_trainer_combo_win_pct: 0.05
    post_position: 7
"#;

fn write_card(name: &str, content: &str) -> std::path::PathBuf {
    let path = env::temp_dir().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn card_to_rankings() {
    let path = write_card("furlong_it_card.yaml", CARD);
    let defaults = RaceSetup {
        track_condition: Some(TrackCondition::Fast),
        ..RaceSetup::default()
    };
    let card = load_race_card(&path, &defaults).unwrap();
    let _ = fs::remove_file(&path);

    assert_eq!(card.len(), 3);
    assert_eq!(card.setup.display_name(), "Saturday Feature");
    // Race-level fields come from the card, then the config defaults
    assert!(card.entries().iter().all(|e| e.field_size == 5));
    assert!(card
        .entries()
        .iter()
        .all(|e| e.track_condition == TrackCondition::Fast));

    let predictions = predict_race(card.entries(), &ScoringWeights::default());
    let names: Vec<&str> = predictions.iter().map(|p| p.horse.as_str()).collect();
    assert_eq!(names, ["Secretariat", "Steady Eddie", "Mud Lark"]);

    let total: f64 = predictions.iter().map(|p| p.win_probability).sum();
    assert!((total - 100.0).abs() <= 0.1 + 1e-9, "total was {}", total);
    assert!(predictions.windows(2).all(|w| w[0].score >= w[1].score));

    // Same input, same bits
    let again = predict_race(card.entries(), &ScoringWeights::default());
    assert_eq!(predictions, again);

    let picks = betting_picks(&predictions).unwrap();
    assert_eq!(picks.favorite.horse, "Secretariat");
    assert_eq!(picks.value_play.horse, "Steady Eddie");
    assert_eq!(picks.longshot.horse, "Mud Lark");
}

#[test]
fn invalid_card_names_the_horse_and_field() {
    let bad = CARD.replace("recent_finishes: [2, 1, 3]", "recent_finishes: [2, 0, 3]");
    let path = write_card("furlong_it_bad_card.yaml", &bad);
    // Horse 0 is valid, so the error has to come from horse 1
    let defaults = RaceSetup {
        track_condition: Some(TrackCondition::Fast),
        ..RaceSetup::default()
    };
    let err = load_race_card(&path, &defaults).unwrap_err();
    let _ = fs::remove_file(&path);

    let message = format!("{:#}", err);
    assert!(message.contains("horses[1] (Steady Eddie)"), "{}", message);
    assert!(message.contains("recent_finishes"), "{}", message);
    assert!(!message.contains("horses[0]"), "{}", message);
}

#[test]
fn two_horse_probability_example() {
    let raw = softmax_probabilities(&[70.0, 50.0]);
    assert_eq!(normalize_percentages(&raw), vec![88.1, 11.9]);
}

#[test]
fn export_matches_csv_format() {
    let path = write_card("furlong_it_export_card.yaml", CARD);
    let defaults = RaceSetup {
        track_condition: Some(TrackCondition::Good),
        ..RaceSetup::default()
    };
    let card = load_race_card(&path, &defaults).unwrap();
    let _ = fs::remove_file(&path);

    let predictions = predict_race(card.entries(), &ScoringWeights::default());
    let dir = env::temp_dir().join("furlong_it_exports");
    let _ = fs::remove_dir_all(&dir);

    let written = export_csv(&dir, &predictions).unwrap();
    let content = fs::read_to_string(&written).unwrap();
    assert!(content.starts_with(CSV_HEADER));
    assert_eq!(content, format_csv(&predictions));

    let _ = fs::remove_dir_all(&dir);
}
