use anyhow::Context;
use serde::Deserialize;
use sleepwatch::kernel::event::{AccelSample, Event};
use sleepwatch::kernel::time::Timestamp;
use sleepwatch::outputs::text::TextRenderer;
use sleepwatch::storage::store::FileStore;
use sleepwatch::{Engine, EngineConfig, Reactor};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// One line of stdin: `{"x":0.0,"y":0.0,"z":1.0}`, `{"bpm":62}`, `"report"` or `"reset"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InputLine {
    Accel { x: f64, y: f64, z: f64 },
    HeartRate { bpm: u16 },
    Command(String),
}

fn to_event(line: InputLine) -> Option<Event> {
    let at = Timestamp::now();
    match line {
        InputLine::Accel { x, y, z } => Some(Event::Accel { at, accel: AccelSample::new(x, y, z) }),
        InputLine::HeartRate { bpm } => Some(Event::HeartRate { bpm }),
        InputLine::Command(cmd) => match cmd.trim().to_ascii_lowercase().as_str() {
            "report" => Some(Event::ReportRequested { at }),
            "reset" => Some(Event::ResetRequested { at }),
            "shutdown" | "quit" => Some(Event::Shutdown { at }),
            other => {
                tracing::warn!("Unknown command '{}'", other);
                None
            }
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    // 2. Config: optional JSON file as first argument
    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => EngineConfig::load(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    tracing::info!("Sleep tracking started. Storage: {}", config.storage_dir.display());

    // 3. Engine + Reactor
    let store = FileStore::new(config.storage_dir.clone());
    let engine = Engine::new(config, store);
    let (tx, rx) = mpsc::channel(100);
    let reactor = Reactor::new(rx, engine, TextRenderer::new(std::io::stdout()));

    // 4. Stdin reader. Dropping `tx` at EOF ends the session.
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() { continue; }

            let parsed = match serde_json::from_str::<InputLine>(&line) {
                Ok(parsed) => parsed,
                Err(_) => InputLine::Command(line),
            };
            let Some(event) = to_event(parsed) else { continue };

            if let Err(e) = tx.send(event).await {
                tracing::error!("Failed to send input: {}", e);
                break;
            }
        }
    });

    // 5. Ctrl-C triggers the shutdown flush
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    reactor.run(cancel).await;
    tracing::info!("App exiting...");
    Ok(())
}
