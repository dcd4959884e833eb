use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use session_core::{
    commands::suggest,
    config::{load_settings_from, DEFAULT_CONFIG_FILE},
    GameSession, SubmitOutcome,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

mod input;
mod sink;

use input::{parse_input, Input};
use sink::{format_status, TerminalSink};

#[derive(Parser, Debug)]
struct Args {
    /// Overrides the server url from the config file and environment.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[arg(long)]
    poll_interval_ms: Option<u64>,
    #[arg(long, default_value = "info")]
    log_filter: String,
}

const HELP: &str = "?<text> hints | !<n> choose a path | :up / :down recall, then Enter to resend | :status | :refresh | :quit";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(args.log_filter.as_str())
        .with_writer(std::io::stderr)
        .init();

    let mut settings = load_settings_from(&args.config, |key| std::env::var(key).ok());
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(poll_interval_ms) = args.poll_interval_ms {
        settings.poll_interval_ms = poll_interval_ms;
    }

    let sink = Arc::new(TerminalSink::new(std::io::stdout()));
    let session = GameSession::connect(settings, sink).context("failed to set up session")?;
    println!("{HELP}");

    let running = session.start().await;
    info!(pending_tutorial = ?running.pending_tutorial, "session started");

    let orchestrator = session.orchestrator();
    let mut recalled: Option<String> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .context("failed to read from stdin")?
    {
        let outcome = match parse_input(&line) {
            Input::Quit => break,
            Input::Blank => match recalled.take() {
                Some(command) if !command.is_empty() => orchestrator.submit(&command).await,
                _ => continue,
            },
            Input::Suggest(prefix) => {
                for spec in suggest(&prefix) {
                    println!("  {:<14} {}", spec.name, spec.description);
                }
                continue;
            }
            Input::Recall(direction) => {
                if let Some(candidate) = session.store().navigate_history(direction) {
                    println!("> {candidate}");
                    recalled = Some(candidate);
                }
                continue;
            }
            Input::Refresh => {
                running.check_now();
                continue;
            }
            Input::ShowStatus => {
                match session.store().state().status {
                    Some(status) => println!("{}", format_status(&status)),
                    None => println!("status not loaded yet"),
                }
                continue;
            }
            Input::Choose(index) => orchestrator.choose_path(index).await,
            Input::Command(command) => orchestrator.submit(&command).await,
        };
        recalled = None;
        debug!(?outcome, "input handled");
        if let SubmitOutcome::Ignored = outcome {
            println!("{HELP}");
        }
    }

    running.shutdown().await;
    info!("session closed");
    Ok(())
}
