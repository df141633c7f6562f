//! `mytasks` command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration (file + flags), start logging, open the selected
//!   storage backend once.
//! - Dispatch one-shot subcommands or the interactive menu.

mod menu;
mod render;

use anyhow::Context;
use chrono::{Local, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use log::warn;
use menu::Menu;
use mytasks_core::{
    config, init_logging, open_store, AppConfig, AuthService, Identity, StorageBackend,
    TaskService, TaskStore,
};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mytasks", version, about = "Personal task tracker")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file.
    #[arg(short, long, default_value = "mytasks.toml")]
    config: PathBuf,

    /// Storage backend override (`sqlite` or `flat_file`).
    #[arg(long)]
    backend: Option<StorageBackend>,

    /// Data directory override.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level override (`trace|debug|info|warn|error`).
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Args)]
struct Credentials {
    #[arg(short, long)]
    username: String,

    #[arg(short, long, env = "MYTASKS_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive register/login/task menu (default).
    Menu,
    /// Register a new account.
    Register {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Add a task.
    Add {
        #[command(flatten)]
        credentials: Credentials,
        /// Task title.
        title: String,
        /// Due date, `YYYY-MM-DD`.
        #[arg(short, long)]
        due: String,
        #[arg(long)]
        category: Option<String>,
    },
    /// Show all tasks, sorted.
    List {
        #[command(flatten)]
        credentials: Credentials,
        /// Sort key: title, due_date or category.
        #[arg(short, long, default_value = "due_date")]
        sort: String,
    },
    /// Search task titles, ignoring case.
    Search {
        #[command(flatten)]
        credentials: Credentials,
        query: String,
    },
    /// Show tasks due today or earlier.
    Due {
        #[command(flatten)]
        credentials: Credentials,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let app_config = resolve_config(&cli)?;

    let log_dir = app_config
        .resolved_log_dir()
        .context("failed to resolve log directory")?;
    if let Err(err) = init_logging(&app_config.logging.level, &log_dir) {
        eprintln!("warning: logging disabled: {err}");
    }

    let store = open_store(&app_config.storage).with_context(|| {
        format!(
            "failed to open {} store in `{}`",
            app_config.storage.backend,
            app_config.storage.data_dir.display()
        )
    })?;

    run(cli.command.unwrap_or(Command::Menu), store.as_ref())
}

fn resolve_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut app_config = config::load(&cli.config)?;
    if let Some(backend) = cli.backend {
        app_config.storage.backend = backend;
    }
    if let Some(data_dir) = &cli.data_dir {
        app_config.storage.data_dir = data_dir.clone();
    }
    if let Some(level) = &cli.log_level {
        app_config.logging.level = level.clone();
    }
    Ok(app_config)
}

fn run(command: Command, store: &dyn TaskStore) -> anyhow::Result<()> {
    let auth = AuthService::new(store);
    let tasks = TaskService::new(store);

    match command {
        Command::Menu => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            Menu::new(auth, tasks, stdin.lock(), stdout.lock(), now).run()?;
        }
        Command::Register { credentials } => {
            auth.register(&credentials.username, &credentials.password)?;
            println!("Registration successful!");
        }
        Command::Add {
            credentials,
            title,
            due,
            category,
        } => {
            let identity = login(&auth, &credentials)?;
            let task_id = tasks.add(&identity, &title, &due, category.as_deref())?;
            println!("Task added successfully! (id {task_id})");
        }
        Command::List { credentials, sort } => {
            let identity = login(&auth, &credentials)?;
            let sorted = tasks.list_sorted(&identity, &sort)?;
            if sorted.fell_back() {
                warn!("event=cli_list module=cli status=sort_fallback");
                eprintln!("Invalid sort key. Using default ('{}').", sorted.key);
            }
            if sorted.tasks.is_empty() {
                println!("No tasks for you. Please add one.");
            } else {
                println!("Number of tasks: {}", sorted.tasks.len());
                print!("{}", render::task_table(&sorted.tasks));
            }
        }
        Command::Search { credentials, query } => {
            let identity = login(&auth, &credentials)?;
            let found = tasks.search(&identity, &query)?;
            if found.is_empty() {
                println!("No tasks found matching the search criteria.");
            } else {
                println!("Number of tasks found: {}", found.len());
                print!("{}", render::search_table(&found));
            }
        }
        Command::Due { credentials } => {
            let identity = login(&auth, &credentials)?;
            let due = tasks.due(&identity, now())?;
            if due.is_empty() {
                println!("No tasks are due today.");
            } else {
                println!("Upcoming Tasks:");
                for task in &due {
                    println!("- {} (Due: {})", task.title, task.due_date_text());
                }
            }
        }
    }

    Ok(())
}

fn login(
    auth: &AuthService<&dyn TaskStore>,
    credentials: &Credentials,
) -> anyhow::Result<Identity> {
    Ok(auth.login(&credentials.username, &credentials.password)?)
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
