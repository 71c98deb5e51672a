use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::scoring::{round_to, BettingPicks, PredictionResult};

pub const CSV_HEADER: &str = "Horse,Score,Win_Probability,Beyer_Figure,Form_Score,Class_Score,Jockey_Score,Trainer_Score,Post_Advantage";

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
pub fn truncate_title(title: &str, max_width: usize) -> String {
    let chars: Vec<char> = title.chars().collect();
    if chars.len() <= max_width {
        title.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format a win probability percentage: "88.1%"
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Format predictions as a ranked table with columns:
/// Rank, Win %, Score, Speed, Horse
///
/// No headers. Horse names are truncated to the terminal width when stdout
/// is a terminal, left whole when piped.
pub fn format_prediction_table(predictions: &[PredictionResult], use_colors: bool) -> String {
    if predictions.is_empty() {
        return "No horses entered.".to_string();
    }

    let term_width = get_terminal_width();

    // " 1." + space + "100.0%" + "  " + " 92.40" + "  " + "102.0" + "  "
    let fixed_width = 3 + 1 + 6 + 2 + 6 + 2 + 5 + 2;

    predictions
        .iter()
        .enumerate()
        .map(|(idx, p)| {
            let rank = format!("{:>2}.", idx + 1);
            let win = format!("{:>6}", format_percent(p.win_probability));
            let score = format!("{:>6.2}", p.score);
            let speed = format!("{:>5.1}", p.sub_scores.speed);

            let name = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_title(&p.horse, width - fixed_width)
                }
                Some(_) => truncate_title(&p.horse, 20),
                None => p.horse.clone(),
            };

            if use_colors {
                format!(
                    "{} {}  {}  {}  {}",
                    rank.dimmed(),
                    win.bold(),
                    score.cyan(),
                    speed.yellow(),
                    name
                )
            } else {
                format!("{} {}  {}  {}  {}", rank, win, score, speed, name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Multi-line breakdown of one horse's composite score
pub fn format_breakdown(prediction: &PredictionResult, use_colors: bool) -> String {
    let mut lines = Vec::with_capacity(prediction.factors.len() + 2);

    let header = format!(
        "{}  score {:.2}  win {}",
        prediction.horse,
        prediction.score,
        format_percent(prediction.win_probability)
    );
    lines.push(if use_colors {
        header.bold().to_string()
    } else {
        header
    });

    for factor in &prediction.factors {
        lines.push(format!(
            "  {:<8} {:>7.3} x {:>4.2} = {:>6.2}",
            factor.label, factor.raw, factor.weight, factor.points
        ));
    }
    lines.push(format!("  {:<8} {:>27.2}", "Total", prediction.score));

    lines.join("\n")
}

/// One line naming the favorite, value play and longshot
pub fn format_picks(picks: &BettingPicks<'_>, use_colors: bool) -> String {
    let fav = format!(
        "{} ({})",
        picks.favorite.horse,
        format_percent(picks.favorite.win_probability)
    );
    let value = format!(
        "{} ({})",
        picks.value_play.horse,
        format_percent(picks.value_play.win_probability)
    );
    let long = format!(
        "{} ({})",
        picks.longshot.horse,
        format_percent(picks.longshot.win_probability)
    );

    if use_colors {
        format!(
            "Favorite: {}  Value: {}  Longshot: {}",
            fav.green(),
            value.yellow(),
            long.magenta()
        )
    } else {
        format!("Favorite: {}  Value: {}  Longshot: {}", fav, value, long)
    }
}

/// Format predictions as tab-separated values for scripting
/// Columns: rank, win %, score, horse (no headers, no colors)
pub fn format_tsv(predictions: &[PredictionResult]) -> String {
    if predictions.is_empty() {
        return String::new();
    }

    predictions
        .iter()
        .enumerate()
        .map(|(idx, p)| {
            format!(
                "{}\t{:.1}\t{:.2}\t{}",
                idx + 1,
                p.win_probability,
                p.score,
                p.horse
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Quote a CSV field when it contains a delimiter, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Full prediction set as CSV, header first
pub fn format_csv(predictions: &[PredictionResult]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for p in predictions {
        let s = &p.sub_scores;
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{}\n",
            csv_field(&p.horse),
            round_to(p.score, 2),
            round_to(p.win_probability, 1),
            round_to(s.speed, 1),
            round_to(s.form, 3),
            round_to(s.class, 3),
            round_to(s.jockey, 3),
            round_to(s.trainer, 3),
            round_to(s.post, 3),
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race::{HorseEntry, RaceClass, TrackCondition};
    use crate::scoring::{predict_race, ScoringWeights};

    fn horse(name: &str, speed_figure: u32, post_position: u32) -> HorseEntry {
        HorseEntry {
            name: name.to_string(),
            speed_figure,
            recent_speed_figures: vec![82, 84, 85],
            recent_finishes: vec![2, 1, 3],
            race_class: RaceClass::Allowance,
            horse_class: RaceClass::Allowance,
            jockey_win_pct: 0.12,
            trainer_win_pct: 0.15,
            jockey_trainer_combo_win_pct: 0.20,
            post_position,
            field_size: 8,
            race_distance_furlongs: 8.5,
            track_condition: TrackCondition::Fast,
        }
    }

    fn predictions() -> Vec<PredictionResult> {
        predict_race(
            &[
                horse("Slow Poke", 70, 2),
                horse("Thunder Bolt", 95, 4),
                horse("Midnight, Express", 85, 1),
            ],
            &ScoringWeights::default(),
        )
    }

    // truncate_title tests
    #[test]
    fn test_truncate_title_short() {
        assert_eq!(truncate_title("Short name", 20), "Short name");
    }

    #[test]
    fn test_truncate_title_exact() {
        assert_eq!(truncate_title("Exact", 5), "Exact");
    }

    #[test]
    fn test_truncate_title_long() {
        assert_eq!(truncate_title("Seabiscuit Returns Again", 15), "Seabiscuit R...");
    }

    #[test]
    fn test_truncate_title_unicode() {
        assert_eq!(truncate_title("Señor Rápido", 12), "Señor Rápido");
        assert_eq!(truncate_title("Señor Rápido Dos", 10), "Señor R...");
    }

    #[test]
    fn test_truncate_title_very_narrow() {
        assert_eq!(truncate_title("Secretariat", 3), "Sec");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(88.1), "88.1%");
        assert_eq!(format_percent(100.0), "100.0%");
    }

    // format_prediction_table tests
    #[test]
    fn test_format_prediction_table_empty() {
        assert_eq!(format_prediction_table(&[], false), "No horses entered.");
    }

    #[test]
    fn test_format_prediction_table_ranked() {
        let result = format_prediction_table(&predictions(), false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with(" 1."));
        assert!(lines[0].contains("Thunder Bolt"));
        assert!(lines[1].starts_with(" 2."));
        assert!(lines[2].contains("Slow Poke"));
        assert!(lines[0].contains('%'));
    }

    #[test]
    fn test_format_breakdown_lists_every_factor() {
        let preds = predictions();
        let result = format_breakdown(&preds[0], false);
        for label in ["Speed", "Form", "Class", "Jockey", "Trainer", "Post", "Total"] {
            assert!(result.contains(label), "missing {}", label);
        }
        assert!(result.starts_with("Thunder Bolt"));
    }

    #[test]
    fn test_format_picks() {
        let preds = predictions();
        let picks = crate::scoring::betting_picks(&preds).unwrap();
        let result = format_picks(&picks, false);
        assert!(result.starts_with("Favorite: Thunder Bolt"));
        assert!(result.contains("Longshot: Slow Poke"));
    }

    // format_tsv tests
    #[test]
    fn test_format_tsv_empty() {
        assert_eq!(format_tsv(&[]), "");
    }

    #[test]
    fn test_format_tsv_columns() {
        let result = format_tsv(&predictions());
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].split('\t').count(), 4);
        assert!(lines[0].starts_with("1\t"));
        assert!(lines[0].ends_with("\tThunder Bolt"));
    }

    // format_csv tests
    #[test]
    fn test_format_csv_header_only_when_empty() {
        assert_eq!(format_csv(&[]), format!("{}\n", CSV_HEADER));
    }

    #[test]
    fn test_format_csv_rows_and_quoting() {
        let preds = predictions();
        let result = format_csv(&preds);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], CSV_HEADER);
        assert!(lines[1].starts_with("Thunder Bolt,"));
        assert!(lines[2].starts_with("\"Midnight, Express\","));

        // Nine columns once the quoted name is accounted for
        let unquoted = lines[1].split(',').count();
        assert_eq!(unquoted, 9);
    }

    #[test]
    fn test_format_csv_rounding() {
        let preds = predictions();
        let result = format_csv(&preds);
        let row: Vec<&str> = result.lines().nth(1).unwrap().split(',').collect();
        let p = &preds[0];
        assert_eq!(row[1].parse::<f64>().unwrap(), round_to(p.score, 2));
        assert_eq!(row[2].parse::<f64>().unwrap(), p.win_probability);
        assert_eq!(row[3].parse::<f64>().unwrap(), round_to(p.sub_scores.speed, 1));
        assert_eq!(row[8].parse::<f64>().unwrap(), round_to(p.sub_scores.post, 3));
    }

    #[test]
    fn test_csv_field_escapes_quotes() {
        assert_eq!(csv_field("Plain"), "Plain");
        assert_eq!(csv_field("Say \"Hi\""), "\"Say \"\"Hi\"\"\"");
        assert_eq!(csv_field("Line\nBreak"), "\"Line\nBreak\"");
    }
}
