use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, save_config, Config, ThemeMode};
use crate::race::{RaceClass, RaceSetup, TrackCondition};
use crate::scoring::{validate_weights, ScoringWeights};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Keep prompting until `parse` accepts the answer. An empty answer takes
/// the default.
fn prompt_parsed<T, F>(message: &str, default: &str, parse: F) -> Result<T>
where
    F: Fn(&str) -> Result<T, String>,
{
    loop {
        let input = prompt_with_default(message, default)?;
        match parse(&input) {
            Ok(value) => return Ok(value),
            Err(e) => println!("  Invalid: {}. Try again.", e),
        }
    }
}

fn parse_weight(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Ok(_) => Err("must be a non-negative number".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("Furlong Configuration Wizard");
    println!("============================");
    println!();

    // 1. Scoring weights
    let defaults = ScoringWeights::default();
    println!("Every horse gets six sub-scores: speed, form, class, jockey, trainer and post.");
    println!("The weights decide how much each one counts toward the final score.");
    let configure_scoring =
        prompt_yes_no("Customize scoring weights? (n accepts defaults)", false)?;

    let scoring = if configure_scoring {
        loop {
            let mut weights = defaults.clone();
            weights.speed =
                prompt_parsed("Speed weight", &defaults.speed.to_string(), parse_weight)?;
            weights.form = prompt_parsed("Form weight", &defaults.form.to_string(), parse_weight)?;
            weights.class =
                prompt_parsed("Class weight", &defaults.class.to_string(), parse_weight)?;
            weights.jockey =
                prompt_parsed("Jockey weight", &defaults.jockey.to_string(), parse_weight)?;
            weights.trainer =
                prompt_parsed("Trainer weight", &defaults.trainer.to_string(), parse_weight)?;
            weights.post = prompt_parsed("Post weight", &defaults.post.to_string(), parse_weight)?;

            match validate_weights(&weights) {
                Ok(()) => break Some(weights),
                Err(errors) => {
                    for error in errors {
                        println!("  {}", error);
                    }
                    println!("  Let's try that again.");
                }
            }
        }
    } else {
        None
    };

    // 2. Race defaults
    println!();
    println!("New entries pick up the race distance, going and field size from these defaults.");
    let distance = prompt_parsed("Default distance (furlongs)", "8.5", |s| {
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
            Ok(_) => Err("must be a non-negative distance".to_string()),
            Err(e) => Err(e.to_string()),
        }
    })?;
    let track_condition: TrackCondition =
        prompt_parsed("Default track condition", TrackCondition::Fast.key(), |s| s.parse())?;
    let field_size = prompt_parsed("Default field size", "8", |s| match s.parse::<u32>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(v) => Ok(v),
        Err(e) => Err(e.to_string()),
    })?;
    let class = prompt_parsed("Default race class (or 'none')", "none", |s| {
        if s.eq_ignore_ascii_case("none") {
            Ok(None)
        } else {
            s.parse::<RaceClass>().map(Some)
        }
    })?;

    // 3. Presentation
    println!();
    let theme = prompt_parsed("Theme (auto, dark, light)", "auto", |s| {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ThemeMode::Auto),
            "dark" => Ok(ThemeMode::Dark),
            "light" => Ok(ThemeMode::Light),
            other => Err(format!("unknown theme '{}'", other)),
        }
    })?;
    let export_dir = prompt_with_default("Directory for exported CSV files", ".")?;

    // 4. Config path
    let default_config_path = match default_path {
        Some(p) => p,
        None => get_config_path()?,
    };
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    // Check if file already exists
    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 5. Write config
    let config = Config {
        scoring,
        theme,
        export_dir: Some(PathBuf::from(export_dir)),
        race: RaceSetup {
            class,
            distance_furlongs: Some(distance),
            track_condition: Some(track_condition),
            field_size: Some(field_size),
            ..RaceSetup::default()
        },
    };
    save_config(&config_path, &config)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `furlong` to start entering horses, or `furlong predict <card.yaml>`.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight("0.25"), Ok(0.25));
        assert!(parse_weight("-1").is_err());
        assert!(parse_weight("inf").is_err());
        assert!(parse_weight("heavy").is_err());
    }
}
