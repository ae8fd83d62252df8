//! Tournament CLI
//!
//! Play games between model rosters and track Elo ratings.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use guess_core::SourceRegistry;
use tournament::{
    play_game, series_game_config, EloConfig, RatingManager, RunConfig, SeriesResults,
    DEFAULT_DATA_DIR,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "tournament")]
#[command(about = "Play guess-the-action games and track model ratings")]
#[command(long_about = "Play guess-the-action games and track model ratings.\n\n\
Run files may use the built-in backends: random, constant:<n> and crowd. \
The llm backend needs a chat client and is only available to programs that \
call llm_source::register_llm.")]
struct Cli {
    /// Rating data directory (overrides the run file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play one game and update the ratings
    Play {
        /// Run file (TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Seed for random fallbacks
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Play several games, rotating through every pair of roster models
    Series {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(short, long, default_value = "10")]
        games: usize,

        #[arg(short, long)]
        seed: Option<u64>,

        /// Series name used in the report and file name
        #[arg(short, long, default_value = "series")]
        name: String,

        /// Where to write the series results (default: <data-dir>/<name>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the current ratings
    Leaderboard,
    /// Write ratings_report.csv
    Report {
        /// Output directory (default: the data directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Export the match history as CSV
    Export {
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Rebuild the ratings from an exported match history
    Import {
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to install log subscriber: {e}");
    }
}

fn load_run_config(path: &Path, seed: Option<u64>) -> Result<RunConfig> {
    let mut run = RunConfig::load(path)
        .with_context(|| format!("failed to load run file {}", path.display()))?;
    if let Some(seed) = seed {
        run.game.seed = Some(seed);
    }
    Ok(run)
}

fn open_manager(data_dir: &Path, config: EloConfig) -> Result<RatingManager> {
    RatingManager::new(data_dir, config)
        .with_context(|| format!("failed to open rating store in {}", data_dir.display()))
}

/// Backends selectable from a run file.
fn registry() -> SourceRegistry {
    let mut registry = SourceRegistry::new();
    baseline_sources::register_baselines(&mut registry);
    registry
}

async fn run_play(cli_data_dir: Option<&Path>, config: &Path, seed: Option<u64>) -> Result<()> {
    let run = load_run_config(config, seed)?;
    let data_dir = run.resolve_data_dir(cli_data_dir);
    let mut manager = open_manager(&data_dir, run.rating)?;

    let (summary, result) = play_game(run.game, &registry()).await?;
    println!("{}", summary.report());

    manager
        .process_game_result(&result)
        .context("failed to update ratings")?;
    println!("{}", manager.elo().format_leaderboard());
    Ok(())
}

async fn run_series(
    cli_data_dir: Option<&Path>,
    config: &Path,
    games: usize,
    seed: Option<u64>,
    name: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let run = load_run_config(config, seed)?;
    if run.game.models.len() < 2 {
        bail!("a series needs at least two models in the roster");
    }
    let data_dir = run.resolve_data_dir(cli_data_dir);
    let mut manager = open_manager(&data_dir, run.rating)?;
    let registry = registry();

    let mut results = SeriesResults::new(name, run.game.clone());
    for game in 0..games {
        let Some(config) = series_game_config(&run.game, game) else {
            bail!("no model pair available for game {}", game + 1);
        };
        info!(game = game + 1, of = games, "series game");

        let (summary, result) = play_game(config, &registry).await?;
        manager
            .process_game_result(&result)
            .with_context(|| format!("failed to rate game {}", game + 1))?;
        results.add_game(&summary, &result);
    }

    let output = output.unwrap_or_else(|| manager.data_dir().join(format!("{name}.json")));
    results
        .save(&output)
        .with_context(|| format!("failed to save series results to {}", output.display()))?;

    println!("{}", results.generate_report());
    println!("{}", manager.elo().format_leaderboard());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cli_data_dir = cli.data_dir.as_deref();
    let store_dir = || {
        cli.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    };

    match cli.command {
        Command::Play { ref config, seed } => run_play(cli_data_dir, config, seed).await,
        Command::Series {
            ref config,
            games,
            seed,
            ref name,
            ref output,
        } => run_series(cli_data_dir, config, games, seed, name, output.clone()).await,
        Command::Leaderboard => {
            let manager = open_manager(&store_dir(), EloConfig::default())?;
            print!("{}", manager.elo().format_leaderboard());
            Ok(())
        }
        Command::Report { ref output_dir } => {
            let manager = open_manager(&store_dir(), EloConfig::default())?;
            let rows = manager.generate_rating_report(output_dir.as_deref())?;
            for row in rows {
                println!("{:>4}  {:<30} {:>8}", row.rank, row.model, row.rating);
            }
            Ok(())
        }
        Command::Export { ref output } => {
            let manager = open_manager(&store_dir(), EloConfig::default())?;
            let rows = manager
                .export_to_csv(output)
                .with_context(|| format!("failed to export to {}", output.display()))?;
            println!("Exported {rows} matches to {}", output.display());
            Ok(())
        }
        Command::Import { ref input } => {
            let mut manager = open_manager(&store_dir(), EloConfig::default())?;
            let rows = manager
                .import_from_csv(input)
                .with_context(|| format!("failed to import {}", input.display()))?;
            println!("Imported {rows} matches from {}", input.display());
            print!("{}", manager.elo().format_leaderboard());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_help_lists_run_file_backends() {
        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains("random, constant:<n> and crowd"));
        assert!(help.contains("llm_source::register_llm"));

        let backends = registry();
        for backend in ["random", "constant", "crowd"] {
            assert!(backends.backends().contains(&backend));
        }
        assert!(!backends.backends().contains(&"llm"));
    }

    #[test]
    fn test_play_arguments() {
        let cli = Cli::try_parse_from([
            "tournament",
            "--data-dir",
            "scratch",
            "play",
            "--config",
            "run.toml",
            "--seed",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("scratch")));
        assert!(matches!(cli.command, Command::Play { seed: Some(3), .. }));
    }
}
