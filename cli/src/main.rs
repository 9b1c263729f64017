mod commands;
mod config;
mod report;
mod server;
mod tui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use taskboard_core::{FileTaskRepository, InMemoryTaskRepository, TaskService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, ValidationMode};
use crate::server::SharedRepo;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "A four-column Kanban board for estimated tasks", long_about = None)]
struct Cli {
    /// Directory holding tasks.json (overrides TASKBOARD_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task (usage: add "Write report" est:1h30m state:todo). Keys take a prefix of two or more letters (es:, st:)
    Add {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Replace a task's fields; omitted fields keep their value
    Edit {
        /// Full id or unique prefix
        id: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Move a task to another state
    Move { id: String, state: String },
    /// Delete a task
    Rm {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List tasks, optionally only those in one state
    List {
        #[arg(short, long)]
        state: Option<String>,
    },
    /// Show every column with its tasks and total estimation
    Board,
    /// Print the allowed states in workflow order
    States,
    /// Run the HTTP procedure server
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
        /// Keep tasks in memory only
        #[arg(long)]
        ephemeral: bool,
        /// Answer invalid writes with 204 instead of 422
        #[arg(long)]
        lenient: bool,
    },
    /// Open the terminal board
    Tui,
}

fn init_tracing(interactive: bool) {
    // The TUI owns the terminal, so it only logs when asked to.
    if interactive && std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "taskboard=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    init_tracing(interactive);

    let mut config = Config::from_env()?;
    if cli.data_dir.is_some() {
        config.data_dir = cli.data_dir;
    }

    let command = cli.command.unwrap_or(Commands::Tui);
    if let Commands::Serve {
        host,
        port,
        ephemeral,
        lenient,
    } = command
    {
        if let Some(host) = host {
            config.host = host;
        }
        if let Some(port) = port {
            config.port = port;
        }
        if lenient {
            config.validation = ValidationMode::Lenient;
        }
        return serve(&config, ephemeral);
    }

    let service = TaskService::new(FileTaskRepository::new(config.data_dir.clone())?);
    match command {
        Commands::Add { args } => commands::add(&service, &args)?,
        Commands::Edit { id, args } => commands::edit(&service, &id, &args)?,
        Commands::Move { id, state } => commands::move_to(&service, &id, &state)?,
        Commands::Rm { id, yes } => commands::remove(&service, &id, yes)?,
        Commands::List { state } => commands::list(&service, state.as_deref())?,
        Commands::Board => commands::board(&service)?,
        Commands::States => commands::states(),
        Commands::Tui => tui::run(service)?,
        Commands::Serve { .. } => {}
    }
    Ok(())
}

fn serve(config: &Config, ephemeral: bool) -> Result<()> {
    let repo: SharedRepo = if ephemeral {
        tracing::info!("Using an in-memory store; tasks are lost on exit");
        Arc::new(InMemoryTaskRepository::new())
    } else {
        Arc::new(FileTaskRepository::new(config.data_dir.clone())?)
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    runtime.block_on(server::serve(config, repo))
}
