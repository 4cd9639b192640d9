//! `ballot` — command-line front end for single elections.
//!
//! The CLI is only a caller: it creates elections, feeds them scripted
//! operations and prints what the state machine decided.

mod config;
mod scenario;

use anyhow::Context;
use ballot_election::ElectionState;
use ballot_types::AccountId;
use ballot_utils::LogFormat;
use clap::Parser;
use config::{DaemonConfig, RandomSourceKind};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ballot", about = "Single-election voting engine")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "BALLOT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "BALLOT_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Tie-break randomness: "os" or "commit-reveal".
    #[arg(long, env = "BALLOT_RANDOM_SOURCE")]
    random_source: Option<RandomSourceKind>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Create an empty election and write its snapshot.
    Deploy {
        /// Administrator account.
        #[arg(long)]
        admin: String,
        /// Election label (defaults to the configured one).
        #[arg(long)]
        label: Option<String>,
        /// Where to write the snapshot.
        #[arg(long)]
        out: PathBuf,
    },
    /// Play a scenario file through every phase and report the result.
    Run {
        /// Scenario TOML file.
        #[arg(long)]
        scenario: PathBuf,
        /// Also write the final snapshot here.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print the final state as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Print the state held in a snapshot file.
    Inspect {
        snapshot: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<DaemonConfig> {
    let mut config = match cli.config {
        Some(ref path) => DaemonConfig::from_toml_file(path)?,
        None => DaemonConfig::default(),
    };
    if let Some(ref level) = cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(source) = cli.random_source {
        config.random_source = source;
    }
    Ok(config)
}

fn write_snapshot(election: &ElectionState, path: &Path) -> anyhow::Result<()> {
    let bytes = election.snapshot()?;
    std::fs::write(path, bytes)
        .with_context(|| format!("failed to write snapshot {}", path.display()))?;
    tracing::info!("Snapshot written to {}", path.display());
    Ok(())
}

fn load_snapshot(path: &Path) -> anyhow::Result<ElectionState> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    Ok(ElectionState::restore(&bytes)?)
}

/// Create an empty election administered by `admin` and park it at `out`.
fn deploy(
    config: &DaemonConfig,
    admin: String,
    label: Option<String>,
    out: &Path,
) -> anyhow::Result<ElectionState> {
    let admin = AccountId::new(admin);
    anyhow::ensure!(admin.is_valid(), "admin account must not be blank");
    let label = label.unwrap_or_else(|| config.election_label.clone());
    let election = ElectionState::with_label(admin, label);
    write_snapshot(&election, out)?;
    Ok(election)
}

fn print_state(election: &ElectionState, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&election.to_snapshot())?);
        return Ok(());
    }
    println!("election: {} (admin {})", election.label(), election.admin());
    println!("phase:    {}", election.phase());
    println!(
        "voters:   {} registered, {} voted",
        election.voter_count(),
        election.votes_cast()
    );
    for c in election.results() {
        println!("  #{:<3} {:<24} {:<16} {:>6}", c.id, c.name, c.party, c.vote_count);
    }
    if let Some(record) = election.winner() {
        let name = election
            .candidate(record.candidate_id)
            .map(|c| c.name.as_str())
            .unwrap_or("?");
        match &record.draw {
            Some(draw) => println!(
                "winner:   #{} {} (drawn from a {}-way tie, randomness {})",
                record.candidate_id,
                name,
                record.tie_size,
                draw.value_hex()
            ),
            None => println!("winner:   #{} {}", record.candidate_id, name),
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    ballot_utils::init_logging(config.log_format, &config.log_level);

    match cli.command {
        Command::Deploy { admin, label, out } => {
            let election = deploy(&config, admin, label, &out)?;
            println!("deployed election {:?} at {}", election.label(), out.display());
        }
        Command::Run {
            scenario,
            out,
            json,
        } => {
            let script = scenario::Scenario::from_toml_file(&scenario)?;
            tracing::info!(
                "Running scenario {} with {} randomness",
                scenario.display(),
                config.random_source
            );
            let random = script.random_source(config.random_source)?;
            let outcome = scenario::run(&script, &config.election_label, random.as_ref())?;
            for (what, why) in &outcome.rejected {
                tracing::warn!("{what}: {why}");
            }
            tracing::info!(
                "Election closed, winner #{} via {} source",
                outcome.winner,
                outcome.source
            );
            if let Some(ref path) = out {
                write_snapshot(&outcome.election, path)?;
            }
            print_state(&outcome.election, json)?;
        }
        Command::Inspect { snapshot, json } => {
            let election = load_snapshot(&snapshot)?;
            print_state(&election, json)?;
        }
    }

    Ok(())
}
