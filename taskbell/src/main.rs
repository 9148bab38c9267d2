//! `taskbell` — task list with one-shot reminder notifications.
//!
//! Tasks live in a JSON document; reminder-bearing tasks arm one-shot
//! alarms that present a notification when they fire. The `watch` command
//! keeps a scheduler running in the foreground; the other commands are
//! one-shot mutations of the task list.
//!
//! ```bash
//! # Add a plain task
//! cargo run --bin taskbell -- add "Buy milk"
//!
//! # Add a reminder
//! cargo run --bin taskbell -- add "Stand-up" --at "2026-08-07 09:25"
//!
//! # Receive reminder notifications
//! cargo run --bin taskbell -- watch
//! ```

use std::path::Path;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use taskbell::alarm::AlarmFired;
use taskbell::alarm::timer::TokioAlarms;
use taskbell::config::{Cli, Command, Config};
use taskbell::notify::console::ConsoleNotifier;
use taskbell::reminder::spawn_reminder_loop;
use taskbell::storage::file::JsonFileStore;
use taskbell::store::TaskStore;
use taskbell_model::task::{TaskId, TaskKind};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        // No subcommand: show usage rather than failing cryptically.
        let _ = Cli::command().print_help();
        std::process::exit(2);
    };

    let cli_for_config = Cli {
        command: None,
        config: cli.config,
        data_file: cli.data_file,
        log_level: cli.log_level,
        log_file: cli.log_file,
    };
    let config = match Config::load(&cli_for_config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let _log_guard = init_logging(&config, matches!(command, Command::Watch));

    if let Err(message) = run(command, &config).await {
        eprintln!("Error: {message}");
        std::process::exit(1);
    }
}

/// Initialize logging.
///
/// Watch mode prefers a log file (notification output owns the terminal);
/// everything else logs to stderr. Returns a [`WorkerGuard`] that must be
/// held until shutdown so buffered entries are flushed.
fn init_logging(config: &Config, watch_mode: bool) -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    if watch_mode && let Some(log_path) = config.log_file.as_deref() {
        let (dir, file_name) = split_log_path(log_path)?;
        let file_appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        tracing_subscriber::fmt()
            .with_writer(non_blocking)
            .with_env_filter(env_filter)
            .with_ansi(false)
            .init();
        return Some(guard);
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .init();
    None
}

/// Splits a log path into directory and file name for the appender.
fn split_log_path(path: &Path) -> Option<(&Path, &str)> {
    let dir = path.parent()?;
    let file_name = path.file_name()?.to_str()?;
    Some((dir, file_name))
}

/// Dispatches one CLI command against the store.
///
/// Every failure surfaces as a single human-readable message; no partial
/// state change is retried.
async fn run(command: Command, config: &Config) -> Result<(), String> {
    let storage = JsonFileStore::open(&config.data_file)
        .await
        .map_err(|e| e.to_string())?;
    let (alarms, fired_rx) = TokioAlarms::new(config.alarm_buffer);
    let store = TaskStore::new(storage, alarms, ConsoleNotifier::new());

    match command {
        Command::Add {
            title,
            reminder,
            at,
        } => {
            let reminder_at = at.as_deref().map(parse_local_datetime).transpose()?;
            let kind = if reminder || reminder_at.is_some() {
                TaskKind::Reminder
            } else {
                TaskKind::Plain
            };
            let task = store
                .add(&title, kind, reminder_at)
                .await
                .map_err(|e| e.to_string())?;
            if task.has_reminder() {
                println!(
                    "Added {} (reminds at {})",
                    task.id,
                    format_timestamp_ms(task.reminder_time)
                );
                println!("(run `taskbell watch` to receive the notification)");
            } else {
                println!("Added {}", task.id);
            }
            Ok(())
        }
        Command::List => {
            let tasks = store.load_all().await.map_err(|e| e.to_string())?;
            if tasks.is_empty() {
                println!("No tasks.");
                return Ok(());
            }
            for task in tasks {
                let when = if task.has_reminder() {
                    format_timestamp_ms(task.reminder_time)
                } else {
                    "-".to_string()
                };
                println!("{}  {:<16}  {}", task.id, when, task.title);
            }
            Ok(())
        }
        Command::Remove { id } => {
            let id: TaskId = id
                .parse()
                .map_err(|e| format!("invalid task id {id:?}: {e}"))?;
            store.remove(&id).await.map_err(|e| e.to_string())?;
            println!("Removed {id}");
            Ok(())
        }
        Command::Watch => watch(store, fired_rx).await,
    }
}

/// Runs the reminder scheduler in the foreground until Ctrl-C.
///
/// Alarms registered by earlier `add` runs died with their processes, so
/// the scheduler re-arms every persisted reminder that is still in the
/// future before it starts consuming wakes.
async fn watch(
    store: TaskStore<JsonFileStore, TokioAlarms, ConsoleNotifier>,
    fired_rx: mpsc::Receiver<AlarmFired>,
) -> Result<(), String> {
    let armed = store
        .reschedule_pending()
        .await
        .map_err(|e| e.to_string())?;
    tracing::info!(armed, "reminder scheduler started");
    println!("Watching for reminders ({armed} armed). Press Ctrl-C to stop.");

    let mut feed = store.subscribe();
    let store = Arc::new(store);
    let loop_handle = spawn_reminder_loop(fired_rx, Arc::clone(&store));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Some(tasks) = feed.next() => {
                tracing::info!(count = tasks.len(), "task list changed");
            }
        }
    }

    loop_handle.abort();
    println!("\nStopped.");
    Ok(())
}

/// Parses a local-time string (`2026-08-06 18:30`, seconds optional)
/// into epoch milliseconds.
fn parse_local_datetime(s: &str) -> Result<u64, String> {
    use chrono::{Local, NaiveDateTime};

    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M"))
        .map_err(|_| format!("invalid reminder time {s:?} (expected \"YYYY-MM-DD HH:MM\")"))?;

    match naive.and_local_timezone(Local) {
        chrono::LocalResult::Single(dt) | chrono::LocalResult::Ambiguous(dt, _) => {
            u64::try_from(dt.timestamp_millis())
                .map_err(|_| format!("reminder time {s:?} is before the epoch"))
        }
        chrono::LocalResult::None => Err(format!("{s:?} is not a valid local time")),
    }
}

/// Formats an epoch-millisecond timestamp as local `YYYY-MM-DD HH:MM`.
fn format_timestamp_ms(ms: u64) -> String {
    use chrono::{Local, TimeZone};

    let secs = i64::try_from(ms / 1000).unwrap_or(i64::MAX);
    let nsecs = u32::try_from((ms % 1000) * 1_000_000).unwrap_or(0);
    match Local.timestamp_opt(secs, nsecs) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        _ => "????-??-?? ??:??".to_string(),
    }
}
