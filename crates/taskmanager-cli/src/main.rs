//! Task Manager CLI - log in, manage your profile and create tasks from the
//! terminal.
//!
//! Command output goes to stdout; logs go to a file in the cache directory so
//! they never interleave with it.

use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use taskmanager_core::models::{NewTask, RegisterRequest, TaskPriority, TaskStatus, UpdateProfileRequest};
use taskmanager_core::{ApiClient, Config, Dashboard, SessionContext, TaskService, UserService};

/// Log file name inside the log directory
const LOG_FILE: &str = "taskmanager.log";

#[derive(Parser)]
#[command(name = "taskmanager", version, about = "Command-line client for the Task Manager API")]
struct Cli {
    /// Override the API base URL for this run
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: String,
    },
    /// Create a new account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Show the logged-in user
    Whoami,
    /// Forget the stored token
    Logout,
    /// Change name and email
    UpdateProfile {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Change the account password
    ChangePassword,
    /// Permanently delete the account
    DeleteAccount {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// List task categories
    Categories,
    /// Create a task
    CreateTask {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Status id (1-5) or name
        #[arg(long, value_parser = parse_status, default_value = "1")]
        status: TaskStatus,
        /// Priority id (1-4) or name
        #[arg(long, value_parser = parse_priority, default_value = "2")]
        priority: TaskPriority,
        /// Deadline as YYYY-MM-DD or an RFC 3339 timestamp
        #[arg(long, value_parser = parse_due)]
        due: Option<DateTime<Utc>>,
        #[arg(long)]
        category: Option<i64>,
    },
    /// Profile and categories at a glance
    Dashboard,
}

fn parse_status(s: &str) -> Result<TaskStatus, String> {
    if let Ok(id) = s.parse::<u8>() {
        return TaskStatus::try_from(id);
    }
    TaskStatus::ALL
        .into_iter()
        .find(|st| st.label().eq_ignore_ascii_case(s) || format!("{:?}", st).eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("unknown status '{}'", s))
}

fn parse_priority(s: &str) -> Result<TaskPriority, String> {
    if let Ok(id) = s.parse::<u8>() {
        return TaskPriority::try_from(id);
    }
    TaskPriority::ALL
        .into_iter()
        .find(|p| p.label().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("unknown priority '{}'", s))
}

fn parse_due(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("'{}' is not a date (YYYY-MM-DD) or RFC 3339 timestamp", s))
}

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` wins, then the configured level, then `warn`. The returned
/// guard flushes the file writer on drop and must outlive `main`'s work.
fn init_tracing(config: &Config) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.as_deref().unwrap_or("warn")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = Config::log_dir()?;
    std::fs::create_dir_all(&log_dir).context("Failed to create log directory")?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(log_dir, LOG_FILE));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    Ok(guard)
}

fn prompt_password(prompt: &str) -> Result<String> {
    rpassword::prompt_password(prompt).context("Failed to read password")
}

fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{} [y/N] ", prompt);
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
        config.validate()?;
    }

    let _guard = init_tracing(&config)?;
    info!(base_url = %config.api_base_url, "Task Manager CLI starting");

    let client = ApiClient::new(config.client_config(), config.token_store()?)?;
    let mut session = SessionContext::new(client.clone());

    match cli.command {
        Command::Login { email } => {
            let password = prompt_password("Password: ")?;
            let user = session.login(&email, &password).await?;
            println!("Logged in as {} <{}>", user.display_name(), user.email);
        }
        Command::Register { name, email } => {
            let password = prompt_password("Password: ")?;
            let password_confirmation = prompt_password("Confirm password: ")?;
            let request = RegisterRequest {
                name,
                email,
                password,
                password_confirmation,
            };
            let user = session.users().register_user(&request).await?;
            println!("Account created for {}. You can log in now.", user.email);
        }
        Command::Whoami => {
            if session.restore().await? {
                if let Some(user) = session.user() {
                    println!("{} <{}>", user.display_name(), user.email);
                    if !user.roles.is_empty() {
                        println!("Roles: {}", user.roles.join(", "));
                    }
                }
            } else {
                println!("Not logged in");
            }
        }
        Command::Logout => {
            session.logout()?;
            println!("Logged out");
        }
        Command::UpdateProfile { name, email } => {
            require_login(&mut session).await?;
            let user = session
                .update_profile(&UpdateProfileRequest { name, email })
                .await?;
            println!("Profile updated: {} <{}>", user.display_name(), user.email);
        }
        Command::ChangePassword => {
            require_login(&mut session).await?;
            let current = prompt_password("Current password: ")?;
            let new = prompt_password("New password: ")?;
            let repeat = prompt_password("Repeat new password: ")?;
            if new != repeat {
                anyhow::bail!("{}", taskmanager_core::ValidationError::PasswordMismatch);
            }
            session.users().change_password(&current, &new).await?;
            println!("Password changed");
        }
        Command::DeleteAccount { yes } => {
            require_login(&mut session).await?;
            if !yes && !confirm("Delete your account permanently?")? {
                println!("Cancelled");
                return Ok(());
            }
            session.delete_account().await?;
            println!("Account deleted");
        }
        Command::Categories => {
            let categories = TaskService::new(client).categories().await?;
            if categories.is_empty() {
                println!("No categories");
            }
            for category in categories {
                println!("{:>4}  {}", category.id, category.name);
            }
        }
        Command::CreateTask {
            title,
            description,
            status,
            priority,
            due,
            category,
        } => {
            let task = NewTask {
                title,
                description,
                status,
                priority,
                due,
                category_id: category,
            };
            let created = TaskService::new(client).create_task(&task).await?;
            println!(
                "Created task #{} ({}, {} priority)",
                created.id,
                created.status().unwrap_or(status),
                created.priority().unwrap_or(priority)
            );
        }
        Command::Dashboard => {
            let dashboard = Dashboard::load(&UserService::new(client.clone()), &TaskService::new(client)).await?;
            println!("{}", dashboard.greeting());
            println!("{} categories", dashboard.categories.len());
            for category in &dashboard.categories {
                println!("  - {}", category.name);
            }
        }
    }

    Ok(())
}

async fn require_login(session: &mut SessionContext) -> Result<()> {
    if !session.restore().await? {
        anyhow::bail!("Not logged in. Run `taskmanager login --email <email>` first.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("3"), Ok(TaskStatus::Done));
        assert_eq!(parse_status("blocked"), Ok(TaskStatus::Blocked));
        assert_eq!(parse_status("in progress"), Ok(TaskStatus::InProgress));
        assert_eq!(parse_status("InProgress"), Ok(TaskStatus::InProgress));
        assert!(parse_status("9").is_err());
        assert!(parse_status("later").is_err());
    }

    #[test]
    fn test_parse_priority() {
        assert_eq!(parse_priority("4"), Ok(TaskPriority::Urgent));
        assert_eq!(parse_priority("LOW"), Ok(TaskPriority::Low));
        assert!(parse_priority("0").is_err());
    }

    #[test]
    fn test_parse_due() {
        let due = parse_due("2025-01-31").unwrap();
        assert_eq!(due.to_rfc3339(), "2025-01-31T23:59:59+00:00");

        let due = parse_due("2025-01-31T08:00:00-03:00").unwrap();
        assert_eq!(due.to_rfc3339(), "2025-01-31T11:00:00+00:00");

        assert!(parse_due("tomorrow").is_err());
    }

    #[test]
    fn test_api_url_flag_is_optional_and_global() {
        let cli = Cli::try_parse_from(["taskmanager", "whoami"]).unwrap();
        assert!(cli.api_url.is_none());

        let cli = Cli::try_parse_from(["taskmanager", "whoami", "--api-url", "http://localhost:8080"]).unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    fn test_cli_parses_create_task() {
        let cli = Cli::try_parse_from([
            "taskmanager",
            "create-task",
            "Write report",
            "--priority",
            "high",
            "--category",
            "2",
        ])
        .unwrap();
        match cli.command {
            Command::CreateTask {
                title,
                status,
                priority,
                category,
                due,
                ..
            } => {
                assert_eq!(title, "Write report");
                assert_eq!(status, TaskStatus::New);
                assert_eq!(priority, TaskPriority::High);
                assert_eq!(category, Some(2));
                assert!(due.is_none());
            }
            _ => panic!("expected create-task"),
        }
    }
}
