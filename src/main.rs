//! Main entry point for cmd-predictor.
//!
//! Loads the usage model and reads command lines from stdin. Each line is
//! treated as partial input and answered with one suggestion per line,
//! followed by an empty line. A line starting with `!` records an executed
//! command instead, which moves the history window forward.

use cmd_predictor::model::persistence;
use cmd_predictor::utils;
use cmd_predictor::{Predictor, Settings};

use anyhow::{Context as _, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;

const EXECUTED_PREFIX: char = '!';

#[tokio::main]
async fn main() -> Result<()> {
    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = utils::logger::init_logging();

    let settings = Settings::load()?;
    tracing::info!(?settings, "starting");

    let bundle = persistence::load(&settings.model_path)
        .with_context(|| format!("Failed to load model from {}", settings.model_path.display()))?;
    let predictor = Predictor::from_bundle(bundle);
    tracing::info!(
        commands = predictor.model().command_count(),
        context_width = predictor.model().context_width(),
        "model loaded"
    );

    // Ctrl-C aborts the in-flight request and ends the loop
    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal.cancel();
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = shutdown.cancelled() => None,
        };
        let Some(line) = line else { break };

        if let Some(executed) = line.strip_prefix(EXECUTED_PREFIX) {
            predictor.observe_line(executed);
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        let request = shutdown.child_token();
        match predictor.suggest_for_input(
            &line,
            settings.suggestion_count,
            settings.max_duplicates_per_command,
            &request,
        ) {
            Ok(result) => {
                let mut out = String::new();
                for text in result.texts() {
                    out.push_str(text);
                    out.push('\n');
                }
                out.push('\n');
                stdout.write_all(out.as_bytes()).await?;
                stdout.flush().await?;
            }
            Err(e) => {
                tracing::warn!("rejected input '{}': {}", line, e);
                eprintln!("error: {e}");
            }
        }
    }

    tracing::info!("stdin closed, exiting");
    Ok(())
}
