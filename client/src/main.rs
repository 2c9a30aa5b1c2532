//! `justdo` - manage a local task list from the command line.
//!
//! Runs in local mode: the signed-in username and every task list are kept
//! in files under `JUSTDO_DATA_DIR`.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate};
use clap::{Parser, Subcommand};
use justdo_client::kv::FileKvStore;
use justdo_client::{AuthProvider, Config, ListView, LocalAuth, Session, TaskService};
use justdo_engine::{Task, TaskDraft, TaskEdit, TaskFilter, Timestamp};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "justdo")]
#[command(about = "Get things done with simple task lists", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with a username kept on this device
    Login {
        #[arg(value_name = "USERNAME")]
        username: String,
    },

    /// Sign out; tasks go back to the guest list
    Logout,

    /// Show who is signed in
    Whoami,

    /// Add a task
    Add {
        #[arg(value_name = "TITLE")]
        title: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE", value_parser = parse_date)]
        due: Option<Timestamp>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List tasks
    List {
        /// all, active or completed
        #[arg(short, long, default_value = "all")]
        filter: TaskFilter,
    },

    /// Mark a task done, or not done
    Toggle {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Replace a task's title, due date and notes
    Edit {
        #[arg(value_name = "ID")]
        id: String,

        #[arg(long)]
        title: String,

        /// Due date (YYYY-MM-DD); omitted clears it
        #[arg(long, value_name = "DATE", value_parser = parse_date)]
        due: Option<Timestamp>,

        /// Notes; omitted clears them
        #[arg(long)]
        notes: Option<String>,
    },

    /// Set or clear a task's due date
    Due {
        #[arg(value_name = "ID")]
        id: String,

        /// New due date (YYYY-MM-DD)
        #[arg(value_name = "DATE", value_parser = parse_date, required_unless_present = "clear")]
        date: Option<Timestamp>,

        /// Remove the due date
        #[arg(long, conflicts_with = "date")]
        clear: bool,
    },

    /// Delete a task
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Status<'a> {
    session: &'a Session,
    storage_key: String,
    remaining: String,
}

/// Parse a calendar date into midnight UTC in milliseconds.
fn parse_date(s: &str) -> Result<Timestamp, String> {
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))?;
    Ok(date
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default())
}

fn format_date(ts: Timestamp) -> String {
    DateTime::from_timestamp_millis(ts)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn print_task(task: &Task) {
    let mark = if task.completed { "x" } else { " " };
    let mut line = format!("[{mark}] {}  {}", task.id, task.title);
    if let Some(due) = task.due_date {
        line.push_str(&format!("  (due {})", format_date(due)));
    }
    println!("{line}");
    if let Some(notes) = &task.notes {
        println!("      {notes}");
    }
}

fn print_view(view: &ListView) {
    println!("{} ({})", view.counts.remaining_label(), view.filter);
    if view.tasks.is_empty() {
        println!("No tasks yet");
    }
    for task in &view.tasks {
        print_task(task);
    }
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T)) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text(value);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let kv = Arc::new(FileKvStore::open(config.data_dir.clone()).await?);
    tracing::debug!(data_dir = %config.data_dir.display(), "Opened data directory");

    let auth = LocalAuth::new(kv.clone());
    let session = auth.restore().await;

    match cli.command {
        Commands::Login { username } => {
            let session = auth.sign_in(&username, "").await?;
            let service = TaskService::open(kv, None, session.clone()).await;
            let status = Status {
                session: &session,
                storage_key: session.storage_key(),
                remaining: service.counts().await.remaining_label(),
            };
            emit(cli.json, &status, |s| {
                let name = s.session.identity().map_or("", |i| i.label());
                println!("Signed in as {name}. {}", s.remaining);
            })?;
        }
        Commands::Logout => {
            auth.sign_out().await?;
            println!("Signed out");
        }
        Commands::Whoami => {
            let service = TaskService::open(kv, None, session.clone()).await;
            let status = Status {
                session: &session,
                storage_key: session.storage_key(),
                remaining: service.counts().await.remaining_label(),
            };
            emit(cli.json, &status, |s| match s.session.identity() {
                Some(identity) => println!("{} ({})", identity.label(), s.remaining),
                None => println!("Not signed in ({})", s.remaining),
            })?;
        }
        command => {
            let service = TaskService::open(kv, None, session).await;
            run(&service, command, cli.json).await?;
        }
    }

    Ok(())
}

async fn run(
    service: &TaskService,
    command: Commands,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Add { title, due, notes } => {
            let mut draft = TaskDraft::new(title);
            if let Some(due) = due {
                draft = draft.due(due);
            }
            if let Some(notes) = notes {
                draft = draft.notes(notes);
            }
            let task = service.add(draft).await?;
            emit(json, &task, print_task)?;
        }
        Commands::List { filter } => {
            let view = service.view(filter).await;
            emit(json, &view, print_view)?;
        }
        Commands::Toggle { id } => {
            service.toggle(&id).await?;
            if let Some(task) = service.get(&id).await {
                emit(json, &task, print_task)?;
            }
        }
        Commands::Edit {
            id,
            title,
            due,
            notes,
        } => {
            let task = service
                .edit(&id, TaskEdit::new(title).due(due).notes(notes))
                .await?;
            emit(json, &task, print_task)?;
        }
        Commands::Due { id, date, clear } => {
            let due = if clear { None } else { date };
            let task = service.set_due_date(&id, due).await?;
            emit(json, &task, print_task)?;
        }
        Commands::Delete { id } => {
            let task = service.delete(&id).await?;
            emit(json, &task, |t| println!("Deleted {}", t.title))?;
        }
        Commands::Login { .. } | Commands::Logout | Commands::Whoami => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dates_as_utc_midnight() {
        assert_eq!(parse_date("2024-02-01"), Ok(1706745600000));
        assert!(parse_date("02/01/2024").is_err());
        assert_eq!(format_date(1706745600000), "2024-02-01");
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
