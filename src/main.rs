use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn, Level};

use machine_spirit::config::Config;
use machine_spirit::orchestrator::{ChatRequest, Orchestrator};
use machine_spirit::paths::Paths;

/// Machine Spirit console - chat with the orchestrator over stdin/stdout
#[derive(Parser, Debug)]
#[command(name = "machine-spirit", version, about)]
struct Args {
    /// Config file (defaults to ~/.machine_spirit/config/machine_spirit.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Session ID (a new one is generated if omitted)
    #[arg(short, long)]
    session: Option<String>,

    /// User ID
    #[arg(short, long, default_value = "local")]
    user: String,

    /// Conversation mode (default, DEV, OPS, STORY, ANALYST)
    #[arg(short, long)]
    mode: Option<String>,

    /// Override the per-session history cap
    #[arg(long)]
    max_history: Option<usize>,

    /// Log level written to stderr
    #[arg(long, default_value = "info")]
    log_level: Level,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // stdout carries the JSON responses, logs go to stderr
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .init();

    let config_path = match args.config {
        Some(path) => path,
        None => {
            let paths = Paths::from_env()?;
            paths.ensure()?;
            paths.config_file()
        }
    };
    let mut config = Config::load_or_init(&config_path)?;
    if let Some(max) = args.max_history {
        config.orchestrator.max_history_messages = max;
        config.validate()?;
    }

    let mut orchestrator = Orchestrator::from_config(&config);
    let session_id = args
        .session
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let mut mode = args.mode;

    info!(
        session_id = %session_id,
        user_id = %args.user,
        name = %orchestrator.self_model().identity.name,
        "Machine Spirit console ready"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            let mut parts = command.splitn(2, ' ');
            match (parts.next().unwrap_or(""), parts.next().map(str::trim)) {
                ("quit", _) | ("exit", _) => break,
                ("mode", Some(name)) => match orchestrator.self_model().validate_mode(name) {
                    Ok(m) => {
                        info!(mode = %m, "mode switched");
                        mode = Some(name.to_string());
                    }
                    Err(e) => warn!(error = %e, "mode not changed"),
                },
                ("mode", None) => {
                    info!("mode reset to configured default");
                    mode = None;
                }
                ("history", _) => {
                    let history = orchestrator.get_conversation_history(&session_id);
                    println!("{}", serde_json::to_string_pretty(&history)?);
                }
                ("clear", _) => orchestrator.clear_conversation_history(&session_id),
                ("self", _) => {
                    let snapshot = orchestrator.self_model().snapshot();
                    println!("{}", serde_json::to_string_pretty(&snapshot)?);
                }
                (other, _) => warn!(command = %other, "unknown command"),
            }
            continue;
        }

        let request = ChatRequest {
            session_id: session_id.clone(),
            user_id: args.user.clone(),
            text: line.to_string(),
            mode: mode.clone(),
            metadata: None,
        };
        match orchestrator.handle_request(request) {
            Ok(response) => println!("{}", serde_json::to_string(&response)?),
            Err(e) => warn!(error = %e, "message rejected"),
        }
    }

    info!(
        session_id = %session_id,
        messages = orchestrator.self_model().message_count(),
        "console closed"
    );
    Ok(())
}
