//! # Storefront App
//!
//! Orchestration layer around `storefront-core`: configuration, shared
//! state, the submission task, outbound signals and the line shell.
//!
//! ## Module Organization
//! ```text
//! storefront_app/
//! ├── lib.rs          ◄─── You are here (startup & shell loop)
//! ├── config.rs       ◄─── StorefrontConfig (defaults → toml → env)
//! ├── error.rs        ◄─── ApiError, ConfigError
//! ├── signals.rs      ◄─── Signal, SignalSink
//! ├── submit.rs       ◄─── Submitter, SimulatedSubmitter
//! ├── shell.rs        ◄─── Command parsing and dispatch
//! ├── state/
//! │   ├── cart.rs         ◄─── CartState
//! │   └── registration.rs ◄─── RegistrationState, submission task
//! └── commands/
//!     ├── cart.rs     ◄─── list_products, get_cart, add_to_cart
//!     └── register.rs ◄─── get_form, update_field, reset_field, submit
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod shell;
pub mod signals;
pub mod state;
pub mod submit;

use std::path::PathBuf;
use std::sync::Arc;

use storefront_core::Catalog;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::StorefrontConfig;
use shell::{Flow, Shell};
use signals::Signal;
use state::{CartState, RegistrationState};

/// Runs the storefront shell until `quit` or end of input.
///
/// ## Startup Sequence
/// ```text
/// 1. Initialize logging (stderr, RUST_LOG or "info,storefront=debug")
/// 2. Load config (--config <path> or platform config dir, then env)
/// 3. Build catalog, CartState, RegistrationState with a channel sink
/// 4. Loop: stdin line ─► Shell::execute ─► JSON on stdout
///          signal     ─► {"signal": ...} on stdout
/// 5. On quit or EOF: await pending submissions, flush their signals
/// ```
pub async fn run() -> std::io::Result<()> {
    init_tracing();

    let config_path = config_path_from_args(std::env::args().skip(1));
    let config = StorefrontConfig::load_or_default(config_path);
    info!(store = %config.store.name, "Starting storefront");

    let catalog = config.catalog().unwrap_or_else(|e| {
        warn!("Invalid catalog: {}. Using demo products.", e);
        Catalog::demo()
    });

    let (signal_tx, signal_rx) = mpsc::unbounded_channel();
    let registration = RegistrationState::from_config(&config, Arc::new(signal_tx));
    let shell = Shell::new(config, CartState::new(catalog), registration);

    let input = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    serve(shell, input, &mut stdout, signal_rx).await?;

    info!("Storefront shell finished");
    Ok(())
}

/// Drives `shell` from `input` until `quit` or end of input.
///
/// Replies and signals are written to `output` as one JSON document per
/// line. On exit, submissions still in flight are awaited and every signal
/// they emit is written before returning.
pub async fn serve<R, W>(
    shell: Shell,
    input: R,
    output: &mut W,
    mut signals: mpsc::UnboundedReceiver<Signal>,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match shell.execute(&line) {
                    Some(Flow::Reply(value)) => write_line(output, &value).await?,
                    Some(Flow::Quit) => break,
                    None => {}
                }
            }
            Some(signal) = signals.recv() => {
                write_signal(output, signal).await?;
            }
        }
    }

    let in_flight = shell.in_flight();
    if in_flight > 0 {
        info!(in_flight, "Waiting for pending submissions");
    }
    shell.settle_pending().await;

    // Dropping the shell drops the last sender, so the drain below ends.
    drop(shell);
    while let Some(signal) = signals.recv().await {
        write_signal(output, signal).await?;
    }

    Ok(())
}

async fn write_signal<W>(output: &mut W, signal: Signal) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    write_line(output, &serde_json::json!({ "signal": signal })).await
}

async fn write_line<W>(output: &mut W, value: &serde_json::Value) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = value.to_string();
    line.push('\n');
    output.write_all(line.as_bytes()).await?;
    output.flush().await
}

/// Initializes the tracing subscriber. Logs go to stderr so stdout stays JSON.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=storefront=trace` - Trace for storefront crates only
/// - Default: `info,storefront=debug`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Picks `<path>` out of `--config <path>` or `--config=<path>`.
fn config_path_from_args<I>(args: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_config_path_from_args() {
        assert_eq!(
            config_path_from_args(args(&["--config", "/tmp/s.toml"])),
            Some(PathBuf::from("/tmp/s.toml"))
        );
        assert_eq!(
            config_path_from_args(args(&["--config=/etc/storefront.toml"])),
            Some(PathBuf::from("/etc/storefront.toml"))
        );
        assert_eq!(config_path_from_args(args(&[])), None);
        assert_eq!(config_path_from_args(args(&["--config"])), None);
    }

    async fn run_shell_over(input: &str) -> Vec<Value> {
        let config = StorefrontConfig::default();
        let (tx, rx) = mpsc::unbounded_channel();
        let registration = RegistrationState::from_config(&config, Arc::new(tx));
        let shell = Shell::new(config, CartState::default(), registration);

        let mut output = Vec::new();
        serve(shell, BufReader::new(input.as_bytes()), &mut output, rx)
            .await
            .unwrap();

        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    fn signals_of(lines: &[Value]) -> Vec<&Value> {
        lines.iter().filter_map(|line| line.get("signal")).collect()
    }

    const REGISTER_AND_SUBMIT: &str = "set fullName Jane Doe
set email jane@x.com
set password Secret1!
set confirmPassword Secret1!
submit
";

    #[tokio::test(start_paused = true)]
    async fn test_end_of_input_still_delivers_submission_signals() {
        let lines = run_shell_over(REGISTER_AND_SUBMIT).await;

        let signals = signals_of(&lines);
        assert_eq!(signals.len(), 2, "got {:?}", lines);
        assert_eq!(signals[0]["type"], "notify");
        assert_eq!(signals[0]["level"], "success");
        assert_eq!(signals[1]["type"], "navigate");
        assert_eq!(signals[1]["route"], "/store");
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_waits_for_pending_submission() {
        let input = "set fullName Jane Doe
set email jane@x.com
set password Secret1!
set confirmPassword Secret1!
submit
quit
form
";
        let lines = run_shell_over(input).await;

        let navigations = signals_of(&lines)
            .into_iter()
            .filter(|s| s["type"] == "navigate")
            .count();
        assert_eq!(navigations, 1);
        // Nothing after quit is executed.
        assert_eq!(lines.iter().filter(|l| l.get("ok").is_some()).count(), 5);
    }
}
