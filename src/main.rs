mod cli;
mod config;
mod error;
mod output;
mod pattern;
mod reactor;
mod runner;
mod walker;
mod watcher;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, PatternArgs, WatchArgs};
use config::{WatchSettings, WatchtestConfig};
use error::WatchError;
use output::{OutputMode, SessionEvent, emit};
use pattern::{ExclusionFilter, WatchPattern};
use reactor::{ChangeReactor, Reaction};
use runner::CommandRunner;
use walker::list_matches;
use watcher::start_watcher;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli
        .command
        .unwrap_or_else(|| Commands::Watch(WatchArgs::current_dir()))
    {
        Commands::Watch(args) => watch(args).await,
        Commands::List(args) => list(args),
    }
}

/// Log to stderr so stdout carries only session output. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn resolve_root(path: &Path) -> Result<PathBuf, WatchError> {
    let not_found = || WatchError::RootNotFound {
        path: path.to_path_buf(),
    };
    let root = path.canonicalize().map_err(|_| not_found())?;
    if !root.is_dir() {
        return Err(not_found());
    }
    Ok(root)
}

fn list(args: PatternArgs) -> Result<()> {
    let root = resolve_root(&args.path)?;
    let settings = WatchSettings::resolve(
        root.clone(),
        WatchtestConfig::load(&root),
        args.overrides(),
    );
    let pattern = WatchPattern::new(&settings.pattern)?;
    let exclusion = ExclusionFilter::new(settings.exclude);

    for path in list_matches(&settings.root, &pattern, &exclusion)? {
        println!("{path}");
    }
    Ok(())
}

async fn watch(args: WatchArgs) -> Result<()> {
    let root = resolve_root(&args.select.path)?;
    let mode = if args.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };
    let settings = WatchSettings::resolve(
        root.clone(),
        WatchtestConfig::load(&root),
        args.overrides(),
    );

    let pattern = WatchPattern::new(&settings.pattern)?;
    let runner = CommandRunner::new(
        &settings.command,
        settings.root.clone(),
        settings.passthrough,
    )?;
    tracing::info!(
        root = %root.display(),
        pattern = pattern.as_str(),
        command = %runner.display(),
        "watching"
    );

    let reactor = Arc::new(ChangeReactor::new(
        runner,
        ExclusionFilter::new(settings.exclude),
        mode,
    ));

    // Held until return: dropping the handle stops the subscription.
    let (_watcher, mut rx) = start_watcher(&root, pattern.clone(), settings.debounce)
        .context("failed to start file watcher")?;

    emit(
        &mut std::io::stdout(),
        mode,
        &SessionEvent::WatchStarted {
            root: root.display().to_string(),
            pattern: pattern.as_str(),
        },
    )?;

    // Polled from the first iteration so a Ctrl+C during a test run is not lost.
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        // Shutdown wins over events that queued during the previous run.
        let event = tokio::select! {
            biased;

            res = &mut shutdown => {
                res.context("failed to listen for Ctrl+C")?;
                tracing::info!("shutting down");
                break;
            }
            next = rx.recv() => match next {
                Some(event) => event?,
                None => break,
            },
        };

        tracing::debug!(path = %event.path, kind = ?event.kind, "change");

        // Runs block the loop: the next event is not taken until the suite finishes.
        let reactor = Arc::clone(&reactor);
        let reaction = tokio::task::spawn_blocking(move || {
            let mut out = std::io::stdout().lock();
            reactor.on_path_matched(&event, &mut out)
        })
        .await
        .context("reactor task panicked")??;

        if let Reaction::Ran { path, outcome } = reaction {
            tracing::debug!(%path, success = outcome.success, "run complete");
        }
    }

    emit(&mut std::io::stdout(), mode, &SessionEvent::Shutdown)?;
    Ok(())
}
