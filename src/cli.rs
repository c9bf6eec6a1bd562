use clap::{Parser, Subcommand};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::info;

use crate::models::{Task, TaskId};
use crate::reminder::ReminderMonitor;
use crate::store::{SyncError, TaskStore};
use crate::utils::{format_time_for_display, normalize_time_input};

#[derive(Parser)]
#[command(name = "tasksync")]
#[command(about = "Terminal task manager synced with a task API, with reminders")]
#[command(version)]
pub struct Cli {
    /// Custom config file path (`~` is expanded)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (separate dev config and logs)
    #[arg(long)]
    pub dev: bool,

    /// Override the task API base URL from the config file
    #[arg(long)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Print all tasks
    List,
    /// Quickly add a new task
    Add {
        /// Task title
        title: String,
        /// Task description
        #[arg(short, long)]
        description: String,
        /// Start time (YYYY-MM-DDTHH:MM)
        #[arg(short, long)]
        time: String,
    },
    /// Flip a task between complete and incomplete
    Toggle {
        /// Task id as shown by `list`
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task id as shown by `list`
        id: String,
    },
    /// Print reminders to stdout until Ctrl-C
    Watch,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Sync(#[from] SyncError),
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Invalid time '{0}', use YYYY-MM-DDTHH:MM")]
    InvalidTime(String),
    #[error("Failed to listen for Ctrl-C: {0}")]
    Signal(#[from] std::io::Error),
}

/// Plain-text table of tasks, one per line, in server order
pub fn format_task_list(tasks: &[Task], time_format: &str) -> String {
    if tasks.is_empty() {
        return "No tasks".to_string();
    }
    let mut out = String::new();
    for task in tasks {
        let id = task.id.as_ref().map(ToString::to_string).unwrap_or_default();
        let mark = if task.completed { "x" } else { " " };
        out.push_str(&format!(
            "[{}] {:>4}  {}  {} - {}\n",
            mark,
            id,
            format_time_for_display(&task.time, time_format),
            task.title,
            task.description
        ));
    }
    out
}

pub async fn handle_list(store: &TaskStore, time_format: &str) -> Result<(), CliError> {
    store.fetch_all().await?;
    print!("{}", format_task_list(&store.tasks(), time_format));
    Ok(())
}

/// Validate and create a task from the command line
pub async fn handle_add(
    store: &TaskStore,
    title: String,
    description: String,
    time: String,
) -> Result<(), CliError> {
    let task = build_task(title, description, &time)?;
    let title = task.title.clone();
    store.create(task).await?;
    println!("Task added: {}", title);
    Ok(())
}

fn build_task(title: String, description: String, time: &str) -> Result<Task, CliError> {
    if title.trim().is_empty() {
        return Err(CliError::MissingField("Title"));
    }
    if description.trim().is_empty() {
        return Err(CliError::MissingField("Description"));
    }
    let time = normalize_time_input(time).ok_or_else(|| CliError::InvalidTime(time.to_string()))?;
    Ok(Task::new(
        title.trim().to_string(),
        description.trim().to_string(),
        time,
    ))
}

/// Match a typed id against the loaded list by its printed form, so `5`
/// finds a task whether the server sent `5` or `"5"`.
fn resolve_id(store: &TaskStore, raw: &str) -> Option<TaskId> {
    let raw = raw.trim();
    store
        .tasks()
        .into_iter()
        .filter_map(|task| task.id)
        .find(|id| id.to_string() == raw)
}

pub async fn handle_toggle(store: &TaskStore, id: &str) -> Result<(), CliError> {
    // Toggle works on the cached list, so load it first
    store.fetch_all().await?;
    let id = resolve_id(store, id).unwrap_or_else(|| TaskId::from(id));
    store.toggle_complete(&id).await?;
    match store.find(&id) {
        Some(task) => println!("{}: {}", task.title, task.status_label()),
        None => println!("Task {} updated", id),
    }
    Ok(())
}

pub async fn handle_delete(store: &TaskStore, id: &str) -> Result<(), CliError> {
    store.fetch_all().await?;
    let id = resolve_id(store, id).unwrap_or_else(|| TaskId::from(id));
    store.delete(&id).await?;
    println!("Task {} deleted", id);
    Ok(())
}

/// Headless reminder loop: keeps the list fresh and prints each reminder.
pub async fn handle_watch(store: &TaskStore, period: Duration) -> Result<(), CliError> {
    store.fetch_all().await?;
    println!(
        "Watching {} task(s), press Ctrl-C to stop",
        store.tasks().len()
    );

    let (reminder_tx, mut reminder_rx) = mpsc::unbounded_channel();
    let _monitor = ReminderMonitor::new(store.subscribe(), reminder_tx)
        .with_period(period)
        .start();
    let mut refresh = tokio::time::interval(period);
    refresh.tick().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result?;
                info!("watch stopped by user");
                break;
            }
            Some(reminder) = reminder_rx.recv() => println!("{}", reminder.message()),
            _ = refresh.tick() => {
                // Failures are logged by the store; keep watching the last good list
                let _ = store.fetch_all().await;
            }
        }
    }
    Ok(())
}
