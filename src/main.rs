use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use furlong::config::Config;
use furlong::race::RaceCard;
use furlong::scoring::ScoringWeights;

const EXIT_SUCCESS: i32 = 0;
const EXIT_INVALID_CARD: i32 = 1;
const EXIT_IO: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Tsv,
    Csv,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive race board (default if no subcommand)
    Tui {
        /// Race card YAML to preload
        card: Option<PathBuf>,
    },
    /// Rank the horses of a race card and print the predictions
    Predict {
        /// Race card YAML file
        card: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Also write a timestamped CSV into this directory
        #[arg(long, value_name = "DIR")]
        export: Option<PathBuf>,
    },
    /// Create a config file interactively
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "furlong")]
#[command(about = "Horse race handicapping and win probability calculator", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/furlong/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui { card: None });
    let start_time = Instant::now();

    furlong::logging::init_logging(cli.verbose);

    let config_path = cli.config.map(PathBuf::from);

    match command {
        // Init writes the config, so it must not depend on loading one
        Commands::Init => {
            if let Err(e) = furlong::config::init::run_init_wizard(config_path) {
                eprintln!("Init failed: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
        Commands::Tui { card } => {
            let (config, weights) = load_config_or_exit(config_path);
            let race_card = match card {
                Some(path) => load_card_or_exit(&path, &config.race),
                None => RaceCard::new(config.race.clone()),
            };

            let theme = furlong::tui::resolve_theme(config.theme);
            let app = furlong::tui::App::new(
                race_card,
                weights,
                config.export_dir(),
                furlong::tui::ThemeColors::for_theme(theme),
            );

            if let Err(e) = furlong::tui::run_tui(app).await {
                eprintln!("TUI error: {:#}", e);
                std::process::exit(EXIT_IO);
            }
        }
        Commands::Predict {
            card,
            format,
            export,
        } => {
            let (config, weights) = load_config_or_exit(config_path);
            let race_card = load_card_or_exit(&card, &config.race);
            if !race_card.is_ready() {
                tracing::warn!(
                    horses = race_card.len(),
                    "fewer than 2 horses, probabilities are not meaningful"
                );
            }

            let predictions = furlong::scoring::predict_race(race_card.entries(), &weights);
            let use_colors = furlong::output::should_use_colors();

            match format {
                OutputFormat::Table => {
                    println!(
                        "{}",
                        furlong::output::format_prediction_table(&predictions, use_colors)
                    );
                    if let Some(picks) = furlong::scoring::betting_picks(&predictions) {
                        println!();
                        println!("{}", furlong::output::format_picks(&picks, use_colors));
                    }
                    if cli.verbose {
                        for prediction in &predictions {
                            println!();
                            println!(
                                "{}",
                                furlong::output::format_breakdown(prediction, use_colors)
                            );
                        }
                    }
                }
                OutputFormat::Tsv => println!("{}", furlong::output::format_tsv(&predictions)),
                OutputFormat::Csv => print!("{}", furlong::output::format_csv(&predictions)),
                OutputFormat::Json => match serde_json::to_string_pretty(&predictions) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Failed to serialize predictions: {}", e);
                        std::process::exit(EXIT_IO);
                    }
                },
            }

            if let Some(dir) = export {
                match furlong::output::export_csv(&dir, &predictions) {
                    Ok(path) => eprintln!("Exported predictions to {}", path.display()),
                    Err(e) => {
                        eprintln!("Export failed: {:#}", e);
                        std::process::exit(EXIT_IO);
                    }
                }
            }

            tracing::debug!(
                horses = predictions.len(),
                elapsed = ?start_time.elapsed(),
                "predict finished"
            );
        }
    }

    std::process::exit(EXIT_SUCCESS);
}

/// Load and validate the config; every failure is a config exit
fn load_config_or_exit(path: Option<PathBuf>) -> (Config, ScoringWeights) {
    let config = match furlong::config::load_config(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let weights = config.effective_weights();
    if let Err(errors) = furlong::scoring::validate_weights(&weights) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    (config, weights)
}

fn load_card_or_exit(path: &std::path::Path, defaults: &furlong::race::RaceSetup) -> RaceCard {
    match furlong::race::load_race_card(path, defaults) {
        Ok(card) => card,
        Err(e) => {
            eprintln!("Invalid race card: {:#}", e);
            std::process::exit(EXIT_INVALID_CARD);
        }
    }
}
