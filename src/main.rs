//! Strictly Chess - terminal front end for the game session controller.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::path::PathBuf;
use strictly_chess::{
    ChangeKind, Color, ControllerConfig, EngineLevel, GameController, HttpInferenceClient,
    MoveCandidate, SearchBudget, SessionEvent, SessionSnapshot,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Health {
            service_url,
            config,
        } => run_health(config, service_url).await,
        Command::Play {
            config,
            service_url,
            color,
            level,
            nodes,
        } => run_play(config, service_url, color, level, nodes).await,
    }
}

/// Loads the config file and applies the service URL override.
fn load_config(path: PathBuf, service_url: Option<String>) -> Result<ControllerConfig> {
    let config = ControllerConfig::load_or_default(&path)
        .with_context(|| format!("loading {}", path.display()))?;
    Ok(match service_url {
        Some(url) => config.with_service_url(url),
        None => config,
    })
}

/// Pings the inference service.
#[instrument(skip(service_url))]
async fn run_health(config: PathBuf, service_url: Option<String>) -> Result<()> {
    let config = load_config(config, service_url)?;
    let client = HttpInferenceClient::new(config.service_url(), config.request_timeout())?;

    let health = client.health().await?;
    info!(status = %health.status, version = %health.version, "Service healthy");
    println!(
        "{} is {} ({} {})",
        client.base_url(),
        health.status,
        health.message,
        health.version
    );
    Ok(())
}

/// Runs an interactive game on stdin.
#[instrument(skip(service_url))]
async fn run_play(
    config: PathBuf,
    service_url: Option<String>,
    color: Option<Color>,
    level: Option<u32>,
    nodes: Option<u32>,
) -> Result<()> {
    let mut config = load_config(config, service_url)?;
    if let Some(color) = color {
        config = config.with_player_color(color);
    }
    if let Some(level) = level {
        config = config.with_engine_level(EngineLevel::new(level)?);
    }
    if let Some(nodes) = nodes {
        config = config.with_search_budget(SearchBudget::new(nodes)?);
    }

    let controller = GameController::from_config(&config)?;
    let printer = tokio::spawn(print_events(controller.subscribe()));

    println!("Commands: <move> (e2e4, e7e8q), new [white|black], resign, retry,");
    println!("          level <n>, nodes <n>, status, clear, quit");

    controller.start_new_game(
        *config.player_color(),
        *config.engine_level(),
        *config.search_budget(),
    )?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        debug!(command, "Read command");

        match command {
            "quit" | "exit" => break,
            "new" => {
                let color = match words.next() {
                    Some(word) => match word.parse::<Color>() {
                        Ok(color) => color,
                        Err(_) => {
                            println!("Unknown color '{}'", word);
                            continue;
                        }
                    },
                    None => *controller.snapshot().player_color(),
                };
                let snapshot = controller.snapshot();
                controller.start_new_game(
                    color,
                    *snapshot.engine_level(),
                    *snapshot.search_budget(),
                )?;
            }
            "resign" => report(controller.resign_game()),
            "retry" => report(controller.retry_engine_move().map(|_| ())),
            "clear" => controller.clear_error(),
            "status" => print_snapshot(&controller.snapshot()),
            "level" | "nodes" => {
                let Some(value) = words.next().and_then(|w| w.parse::<u32>().ok()) else {
                    println!("Usage: {} <number>", command);
                    continue;
                };
                let result = if command == "level" {
                    controller.set_engine_level(value)
                } else {
                    controller.set_search_budget(value)
                };
                report(result);
            }
            text => match MoveCandidate::from_uci(text) {
                Ok(candidate) => report(
                    controller
                        .make_move(candidate.from(), candidate.to(), candidate.promotion())
                        .map(|_| ()),
                ),
                Err(_) => println!("Unknown command '{}'", text),
            },
        }
    }

    printer.abort();
    info!("Leaving game");
    Ok(())
}

fn report<E: std::fmt::Display>(result: Result<(), E>) {
    if let Err(e) = result {
        warn!(error = %e, "Command rejected");
        println!("Rejected: {}", e);
    }
}

/// Prints every committed change.
async fn print_events(mut events: mpsc::UnboundedReceiver<SessionEvent>) {
    while let Some(SessionEvent { kind, snapshot }) = events.recv().await {
        match kind {
            ChangeKind::NewGame => {
                println!("New game as {}", snapshot.player_color());
                print_snapshot(&snapshot);
            }
            ChangeKind::PlayerMoved | ChangeKind::EngineMoved => {
                if let Some(notation) = snapshot.move_history().last() {
                    let who = if kind == ChangeKind::PlayerMoved { "You" } else { "Engine" };
                    println!("{} played {}", who, notation);
                }
                if *snapshot.is_thinking() {
                    println!("Engine is thinking...");
                }
                if *snapshot.is_game_over() {
                    print_snapshot(&snapshot);
                }
            }
            ChangeKind::EngineFailed => {
                if let Some(error) = snapshot.error() {
                    println!("Engine failed: {} (type 'retry' or 'new')", error);
                }
            }
            ChangeKind::RetryIssued => println!("Engine is thinking..."),
            ChangeKind::Resigned => print_snapshot(&snapshot),
            ChangeKind::SettingsChanged => println!(
                "Engine level {}, search budget {}",
                snapshot.engine_level(),
                snapshot.search_budget()
            ),
            ChangeKind::ErrorCleared => {}
        }
    }
}

fn print_snapshot(snapshot: &SessionSnapshot) {
    println!("Position: {}", snapshot.position());
    println!("Status:   {}", snapshot.status());
    if !snapshot.move_history().is_empty() {
        println!("Moves:    {}", snapshot.move_history().join(" "));
    }
    let captured = snapshot.captured_pieces();
    for color in [Color::White, Color::Black] {
        let lost = captured.of(color);
        if !lost.is_empty() {
            let names: Vec<String> = lost.iter().map(ToString::to_string).collect();
            println!("Lost by {}: {}", color, names.join(", "));
        }
    }
    if let Some(winner) = snapshot.winner() {
        println!("Winner:   {}", winner);
    }
    if *snapshot.is_player_turn() && !snapshot.is_game_over() {
        println!("Your move.");
    }
}
