//! Megaverse client entry point.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use megaverse::{
    resolve_config_path, BuildStatus, Cell, CellCategory, Color, Direction, GoalMapBuilder,
    MegaverseConfig, ObjectRepository,
};

#[derive(Parser)]
#[command(
    name = "megaverse",
    about = "Megaverse client: rebuild the goal map through the rate-limited API",
    version
)]
struct Cli {
    /// Path to the JSON config file.
    /// Falls back to MEGAVERSE_CONFIG, ./config.json, then ~/.megaverse/config.json.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the goal map and place every cell it describes (default).
    Build,

    /// Place the 17-point X cross on an 11x11 grid.
    Cross,

    /// Fetch the goal map and print it without placing anything.
    Goal {
        /// Print the raw goal grid as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   megaverse completions bash > ~/.local/share/bash-completion/completions/megaverse
    ///   megaverse completions zsh > ~/.zfunc/_megaverse
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

fn load_config(explicit: Option<&str>) -> anyhow::Result<MegaverseConfig> {
    let path = resolve_config_path(explicit);
    MegaverseConfig::load(&path)
        .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Build) {
        Commands::Build => {
            let config = load_config(cli.config.as_deref())?;
            tracing::info!("Building goal map for candidate {}", config.candidate_id);
            let builder = GoalMapBuilder::new(ObjectRepository::from_config(&config)?);
            let report = builder.build().await;

            match report.status {
                BuildStatus::Completed => {
                    println!(
                        "Build completed: {} placed, {} failed",
                        report.placed, report.failed
                    );
                }
                BuildStatus::GoalUnavailable => {
                    eprintln!("Goal map unavailable; nothing was placed");
                    std::process::exit(1);
                }
                BuildStatus::Aborted { position, reason } => {
                    eprintln!(
                        "Build aborted at {position}: {reason} ({} placed, {} failed)",
                        report.placed, report.failed
                    );
                    std::process::exit(2);
                }
            }
        }

        Commands::Cross => {
            let config = load_config(cli.config.as_deref())?;
            let repository = ObjectRepository::from_config(&config)?;
            let outcomes = repository.create_cross().await;
            let placed = outcomes.iter().filter(|o| o.is_success()).count();
            println!("Cross: {placed} placed, {} failed", outcomes.len() - placed);
        }

        Commands::Goal { json } => {
            let config = load_config(cli.config.as_deref())?;
            let builder = GoalMapBuilder::new(ObjectRepository::from_config(&config)?);
            let Some(grid) = builder.fetch_goal().await else {
                eprintln!("Goal map unavailable");
                std::process::exit(1);
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&grid)?);
                return Ok(());
            }

            for row in &grid.rows {
                let line: String = row.iter().map(|label| glyph(label)).collect();
                println!("{line}");
            }

            let mut counts = [0usize; 4];
            let mut invalid = 0usize;
            for (_, decoded) in grid.plan() {
                match decoded.map(Cell::category) {
                    Ok(CellCategory::Empty) => counts[0] += 1,
                    Ok(CellCategory::Point) => counts[1] += 1,
                    Ok(CellCategory::ColorMarker) => counts[2] += 1,
                    Ok(CellCategory::DirectionMarker) => counts[3] += 1,
                    Err(_) => invalid += 1,
                }
            }
            println!(
                "{} x {}: {} points, {} color markers, {} direction markers, {} empty, {} invalid",
                grid.height(),
                grid.width(),
                counts[1],
                counts[2],
                counts[3],
                counts[0],
                invalid
            );
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "megaverse", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// One-character preview of a goal label.
fn glyph(label: &str) -> char {
    match Cell::parse_label(label) {
        Ok(Cell::Empty) => '.',
        Ok(Cell::Point) => '*',
        Ok(Cell::ColorMarker(color)) => match color {
            Color::Blue => 'B',
            Color::Red => 'R',
            Color::Purple => 'P',
            Color::White => 'W',
        },
        Ok(Cell::DirectionMarker(direction)) => match direction {
            Direction::Up => '^',
            Direction::Down => 'v',
            Direction::Right => '>',
            Direction::Left => '<',
        },
        Err(_) => '?',
    }
}
