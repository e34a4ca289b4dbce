use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn, Level};

use cube_arena::config::{ArenaConfig, DEFAULT_CONFIG_FILE};
use cube_arena::engine_client::{EngineClient, MoveEngine};
use cube_arena::export;
use cube_arena::game_runner::GameRunner;
use cube_arena::manager::{SchedulingPolicy, TournamentError, TournamentManager};
use cube_arena::progress::Progress;
use cube_arena::text_output;
use cube_arena::tournament_config::{OutputFormat, TournamentConfig};

const PROGRESS_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(name = "cube-arena")]
#[command(about = "Round-robin tournaments between 4x4x4 tic-tac-toe weight matrices")]
struct Cli {
    /// Increase log detail (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Arena settings file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    arena_config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct RosterArgs {
    /// CSV file with a label column and 25 weight columns
    #[arg(short, long)]
    config: PathBuf,
    /// Games per matrix per role in each pairing
    #[arg(short, long)]
    iterations: Option<u32>,
    /// Request randomized tie-breaking from the engine
    #[arg(short, long)]
    randomization: bool,
    /// Comma-separated output formats (json,csv,text)
    #[arg(short, long)]
    formats: Option<String>,
    /// Engine executable
    #[arg(short, long)]
    engine_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full tournament and write reports
    Run {
        #[command(flatten)]
        roster: RosterArgs,
        /// Directory for report files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Matchups to play at once
        #[arg(long)]
        concurrent: Option<usize>,
    },
    /// Check the roster and the engine without playing
    Validate {
        #[command(flatten)]
        roster: RosterArgs,
    },
    /// Show the pairing plan without playing
    Plan {
        #[command(flatten)]
        roster: RosterArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = ArenaConfig::load_from(&cli.arena_config)
        .with_context(|| format!("loading {}", cli.arena_config.display()))?;

    match cli.command {
        Commands::Run {
            roster,
            output_dir,
            concurrent,
        } => run(&settings, &roster, output_dir, concurrent).await,
        Commands::Validate { roster } => validate(&settings, &roster).await,
        Commands::Plan { roster } => plan(&settings, &roster),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn load_tournament(settings: &ArenaConfig, roster: &RosterArgs) -> Result<TournamentConfig> {
    let iterations = roster.iterations.unwrap_or(settings.tournament.iterations);
    let randomization = roster.randomization || settings.tournament.randomization;
    let default_formats = settings.output_format_list();
    let formats = OutputFormat::parse_list(roster.formats.as_deref().unwrap_or(&default_formats))?;

    let config = TournamentConfig::from_csv_path(&roster.config, iterations, randomization, formats)?;
    if config.randomization_enabled() {
        warn!("Randomization requested, but the engine has no randomization flag; games stay deterministic");
    }
    Ok(config)
}

fn engine(settings: &ArenaConfig, roster: &RosterArgs) -> Result<EngineClient> {
    let path = roster
        .engine_path
        .clone()
        .unwrap_or_else(|| settings.engine_path.clone());
    Ok(EngineClient::new(path, settings.engine_timeouts())?)
}

fn plan(settings: &ArenaConfig, roster: &RosterArgs) -> Result<()> {
    let config = load_tournament(settings, roster)?;
    let games_per_matchup = u64::from(config.iterations_per_matchup()) * 2;

    println!("Tournament plan: {}", config);
    println!("\nMatrices:");
    for (i, matrix) in config.matrices().iter().enumerate() {
        println!("  {:2}. {}", i + 1, matrix);
    }
    println!("\nMatchups ({} games each):", games_per_matchup);
    for (i, (a, b)) in config.pairings().iter().enumerate() {
        println!("  {:3}. {} vs {}", i + 1, a.label(), b.label());
    }
    println!(
        "\nOutput formats: {}",
        config
            .output_formats()
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}

async fn validate(settings: &ArenaConfig, roster: &RosterArgs) -> Result<()> {
    let config = load_tournament(settings, roster)?;
    println!("Roster OK: {}", config);

    let client = engine(settings, roster)?;
    client
        .validate()
        .await
        .with_context(|| format!("validating engine {}", client.path().display()))?;
    println!("Engine OK: {}", client.path().display());
    Ok(())
}

async fn run(
    settings: &ArenaConfig,
    roster: &RosterArgs,
    output_dir: Option<PathBuf>,
    concurrent: Option<usize>,
) -> Result<()> {
    let config = load_tournament(settings, roster)?;
    let formats = config.output_formats().to_vec();
    let output_dir = output_dir.unwrap_or_else(|| settings.output_dir.clone());
    let policy = match concurrent {
        Some(0) | Some(1) => SchedulingPolicy::Sequential,
        Some(n) => SchedulingPolicy::Concurrent { max_matchups: n },
        None => settings.scheduling_policy(),
    };

    let runner = GameRunner::with_limits(engine(settings, roster)?, settings.game_limits());
    let mut manager = TournamentManager::new(config, runner).with_policy(policy);
    let progress = manager.progress();

    let outcome = {
        let run = manager.run();
        tokio::pin!(run);
        let mut ticker = tokio::time::interval(PROGRESS_INTERVAL);
        ticker.tick().await;
        loop {
            tokio::select! {
                outcome = &mut run => break outcome,
                _ = ticker.tick() => log_progress(&progress.snapshot()),
            }
        }
    };

    match outcome {
        Ok(report) => {
            let base = export::default_base_name(&report);
            export::write_reports(&report, &output_dir, &base, &formats)?;
            println!("{}", text_output::Summary(&report));
            Ok(())
        }
        Err(TournamentError::Aborted { source, report }) => {
            warn!(
                matchups = report.matchups().len(),
                games = report.total_games_played(),
                "Writing partial results"
            );
            let base = format!("{}_partial", export::default_base_name(&report));
            export::write_reports(&report, &output_dir, &base, &formats)?;
            Err(anyhow::Error::new(source).context(format!(
                "tournament aborted after {} of {} games",
                report.total_games_played(),
                report.expected_games()
            )))
        }
        Err(e) => Err(e.into()),
    }
}

fn log_progress(progress: &Progress) {
    let remaining = progress
        .estimated_remaining
        .map(|d| format!("{}s", d.as_secs()))
        .unwrap_or_else(|| "unknown".to_string());
    info!(
        completed = progress.games_completed,
        total = progress.games_total,
        running = %progress.running_matchups.join(", "),
        "Progress {:.1}%, about {} remaining",
        progress.completion_percentage(),
        remaining
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_run_command() {
        let cli = Cli::try_parse_from([
            "cube-arena", "run", "-c", "matrices.csv", "-i", "10", "-f", "json,text", "-o", "out",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                roster, output_dir, concurrent,
            } => {
                assert_eq!(roster.config, PathBuf::from("matrices.csv"));
                assert_eq!(roster.iterations, Some(10));
                assert_eq!(roster.formats.as_deref(), Some("json,text"));
                assert!(!roster.randomization);
                assert_eq!(output_dir, Some(PathBuf::from("out")));
                assert_eq!(concurrent, None);
            }
            _ => panic!("Expected Run"),
        }
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.arena_config, PathBuf::from("arena.toml"));
    }

    #[test]
    fn test_cli_requires_roster() {
        assert!(Cli::try_parse_from(["cube-arena", "run"]).is_err());
        assert!(Cli::try_parse_from(["cube-arena", "plan", "--config", "m.csv"]).is_ok());
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::try_parse_from([
            "cube-arena", "validate", "-c", "m.csv", "-e", "/bin/tttt", "-vv", "--arena-config", "alt.toml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.arena_config, PathBuf::from("alt.toml"));
        match cli.command {
            Commands::Validate { roster } => {
                assert_eq!(roster.engine_path, Some(PathBuf::from("/bin/tttt")));
            }
            _ => panic!("Expected Validate"),
        }
    }

    #[test]
    fn test_load_tournament_uses_settings_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.csv");
        let mut csv = String::from("label");
        for i in 0..25 {
            csv.push_str(&format!(",w{}", i));
        }
        for label in ["a", "b"] {
            csv.push('\n');
            csv.push_str(label);
            csv.push_str(&",0".repeat(25));
        }
        std::fs::write(&path, csv).unwrap();

        let roster = RosterArgs {
            config: path,
            iterations: None,
            randomization: false,
            formats: Some("csv".to_string()),
            engine_path: None,
        };
        let config = load_tournament(&ArenaConfig::default(), &roster).unwrap();
        assert_eq!(config.iterations_per_matchup(), 100);
        assert_eq!(config.output_formats(), [OutputFormat::Csv]);
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
