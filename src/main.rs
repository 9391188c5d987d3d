//! blobphish CLI
//!
//! Parse the invocation, then hand the terminal to the interactive session.

use std::process::ExitCode;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use blobphish::config::Config;
use blobphish::logging;
use blobphish::signal::SignalObserver;
use blobphish::tui::{self, Theme};
use blobphish::workflow::DryRunExecutor;

fn main() -> ExitCode {
    // Malformed flags print usage and exit 1 from inside the loader
    let config = Config::from_args();
    let theme = Theme::kanagawa();

    if let Err(e) = logging::init(&config) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    match run(&config, &theme) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{}", theme.paint_error(&format!("{e:#}")));
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, theme: &Theme) -> Result<()> {
    if !config.env_file_present() {
        debug!(path = %config.env_path.display(), "environment file not found");
    }

    let cancel = CancellationToken::new();
    let _observer =
        SignalObserver::spawn(cancel.clone()).context("failed to install signal handlers")?;

    let mut executor = DryRunExecutor::new();
    let closing =
        tui::run(config, theme, &mut executor, cancel).context("error running program")?;

    // The alternate screen is gone; repeat the closing notice where it stays
    if let Some(notice) = &closing.notice {
        println!("{}", theme.paint_notice(&format!(" {notice} ")));
    }

    info!(end = ?closing.end, steps_executed = executor.executed(), "exiting");
    Ok(())
}
