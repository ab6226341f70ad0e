//! fives_audit CLI
//!
//! Recompute a stored session, summarise it, or convert snapshots between
//! JSON and MessagePack+LZ4.

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "fives_audit")]
#[command(about = "Recalculate and convert fives club snapshots", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Replay the session processor over a stored session
    Recompute {
        /// Snapshot file (.json or binary)
        #[arg(long)]
        snapshot: PathBuf,

        /// Session id; defaults to the active session
        #[arg(long)]
        session: Option<String>,

        /// Engine config file (.json/.yaml); defaults to FIVES_ENGINE_CONFIG_PATH
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the updated snapshot here
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print the full outcome as JSON instead of a table
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Standings and leaders of a stored session
    Summary {
        #[arg(long)]
        snapshot: PathBuf,

        #[arg(long)]
        session: Option<String>,
    },

    /// Convert a snapshot; the format follows each file's extension
    Convert {
        #[arg(long)]
        r#in: PathBuf,

        #[arg(long)]
        out: PathBuf,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Recompute { snapshot, session, config, out, json } => {
            let mut club = fives_audit::load_snapshot(&snapshot)?;
            let config = match config {
                Some(path) => fives_audit::load_config(&path)?,
                None => fives_core::config::load_from_env().context("Failed to load engine config")?,
            };
            let outcome =
                fives_audit::recompute(&club, session.as_deref(), &config, chrono::Utc::now())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_report(&fives_audit::report(&outcome));
            }

            if let Some(out) = out {
                fives_audit::apply(&mut club, &outcome)?;
                fives_audit::write_snapshot(&out, &club)?;
                println!("\nSnapshot written to: {}", out.display());
            }
        }

        Commands::Summary { snapshot, session } => {
            let club = fives_audit::load_snapshot(&snapshot)?;
            let session = match session.as_deref() {
                Some(id) => club.session(id).with_context(|| format!("Session {} not found", id))?,
                None => club.active_session.as_ref().context("Snapshot has no active session")?,
            };
            let summary = fives_core::StatisticsAggregator::summarize(session);
            println!("Session {} ({} games)", session.id, summary.games_played);
            println!("{:<12} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4}", "team", "P", "W", "D", "L", "GD", "Pts");
            for team in &summary.standings {
                println!(
                    "{:<12} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4}",
                    team.team_id, team.games_played, team.wins, team.draws, team.losses,
                    team.goal_difference, team.points
                );
            }
            if let Some((player, goals)) = &summary.top_scorer {
                println!("Top scorer:   {} ({})", player, goals);
            }
            if let Some((player, assists)) = &summary.top_assister {
                println!("Top assister: {} ({})", player, assists);
            }
        }

        Commands::Convert { r#in, out } => {
            println!("Converting snapshot...");
            println!("   Input:  {}", r#in.display());
            println!("   Output: {}", out.display());
            let meta = fives_audit::convert(&r#in, &out)?;
            println!("   Players:  {}", meta.players);
            println!("   Sessions: {}", meta.sessions);
            println!("   Size:     {} -> {} bytes", meta.input_size, meta.output_size);
            println!("   Checksum: {}", meta.checksum);
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_report(report: &fives_audit::AuditReport) {
    println!("Session {}: {} games, {} players written, {} news items",
        report.session_id, report.games, report.written_players, report.news_items);
    for change in &report.changes {
        let tag = if change.is_penalty { " (inactivity)" } else { "" };
        println!(
            "   {:<12} {:>3} -> {:>3}  {:+.2}{}",
            change.player_id, change.previous_rating, change.new_rating, change.delta, tag
        );
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("fives_audit CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
