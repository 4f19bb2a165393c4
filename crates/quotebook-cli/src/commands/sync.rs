use std::sync::Arc;
use std::time::Duration;

use quotebook_core::events::QuoteEvent;
use quotebook_core::sync::{SyncError, SyncOutcome};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, Mutex};

use crate::commands::common::{format_sync_conflict_lines, Context};
use crate::error::CliError;

pub async fn run_sync(ctx: &Context) -> Result<(), CliError> {
    let engine = ctx.sync_engine()?.ok_or(CliError::RemoteDisabled)?;
    let book = Mutex::new(ctx.open_book()?);
    let mut events = book.lock().await.subscribe();

    let outcome = engine.sync_now(&book).await;
    drain_events(&mut events);
    for line in sync_outcome_lines(outcome)? {
        println!("{line}");
    }
    Ok(())
}

/// Lines reported for a finished `sync` run.
///
/// Remote failures are reported and the next run retries them; only local
/// store and configuration failures become errors.
pub fn sync_outcome_lines(outcome: SyncOutcome) -> Result<Vec<String>, CliError> {
    match outcome {
        SyncOutcome::Completed(report) => {
            let mut lines = vec![format!(
                "Sync completed: {} added, {} updated, {} unchanged",
                report.added, report.overwritten, report.skipped
            )];
            lines.extend(
                format_sync_conflict_lines(&report.conflicts)
                    .into_iter()
                    .map(|line| format!("  {line}")),
            );
            Ok(lines)
        }
        SyncOutcome::Failed(error @ (SyncError::RemoteFetch(_) | SyncError::RemotePush(_))) => {
            Ok(vec![format!("Sync failed, local quotes unchanged: {error}")])
        }
        SyncOutcome::Failed(error) => Err(error.into()),
        SyncOutcome::Skipped | SyncOutcome::Discarded => Ok(vec!["Sync did not run".to_string()]),
    }
}

pub async fn run_watch(interval_secs: Option<u64>, ctx: &Context) -> Result<(), CliError> {
    let interval = match interval_secs {
        Some(0) => {
            return Err(CliError::Config(
                "--interval must be greater than zero".to_string(),
            ))
        }
        Some(secs) => Duration::from_secs(secs),
        None => ctx.config.sync_interval(),
    };
    let engine = Arc::new(ctx.sync_engine()?.ok_or(CliError::RemoteDisabled)?);
    let book = Arc::new(Mutex::new(ctx.open_book()?));
    let mut events = book.lock().await.subscribe();

    println!(
        "Syncing with {} every {}s. Press Ctrl-C to stop.",
        engine.remote().fetch_url(),
        interval.as_secs()
    );
    let handle = engine.spawn_periodic(Arc::clone(&book), interval);

    let result = loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => break signal.map_err(CliError::from),
            event = events.recv() => match event {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("Dropped {skipped} quote events");
                }
                Err(RecvError::Closed) => break Ok(()),
            },
        }
    };

    handle.stop().await;
    println!("Stopped syncing.");
    result
}

fn drain_events(events: &mut broadcast::Receiver<QuoteEvent>) {
    loop {
        match events.try_recv() {
            Ok(event) => print_event(&event),
            Err(TryRecvError::Lagged(_)) => {}
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

fn print_event(event: &QuoteEvent) {
    match event {
        QuoteEvent::Conflict { message, .. } | QuoteEvent::Notice(message) => {
            println!("{message}");
        }
        QuoteEvent::CategoriesChanged(categories) => {
            tracing::debug!("Categories now: {}", categories.join(", "));
        }
        QuoteEvent::QuoteChanged(_) => {}
    }
}
