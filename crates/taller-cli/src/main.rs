use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use taller_core::session::UserId;
use taller_core::work_order::{Priority, Stage, SubState, WorkOrderId};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(name = "taller")]
#[command(about = "TALLER - repair-shop console for work orders and notifications", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(flatten)]
    auth: AuthArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Credentials used when the server has no session to restore.
#[derive(Args)]
pub struct AuthArgs {
    #[arg(long, global = true, env = "TALLER_USERNAME")]
    pub username: Option<String>,

    #[arg(long, global = true, env = "TALLER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the authenticated user
    Whoami,
    /// End the server session
    Logout,
    /// Show the work-order board grouped by stage
    Board(BoardArgs),
    /// List or acknowledge notifications
    Notifications {
        #[command(subcommand)]
        action: NotificationAction,
    },
    /// Move a work order to another stage
    Move(MoveArgs),
    /// Keep the push channel open and print notifications as they arrive
    Watch,
}

#[derive(Args)]
pub struct BoardArgs {
    /// Case-insensitive match on the client's first name
    #[arg(long)]
    pub search: Option<String>,

    /// Only show these priorities (repeatable)
    #[arg(long, value_parser = parse_priority)]
    pub priority: Vec<Priority>,

    /// Only show orders promised within the next days
    #[arg(long)]
    pub due_soon: bool,

    /// Reference date for --due-soon (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

#[derive(Subcommand)]
pub enum NotificationAction {
    /// List the current user's notifications
    List {
        /// Only unread records
        #[arg(long)]
        unread: bool,
    },
    /// Mark one notification read
    Read { id: i64 },
    /// Mark every unread notification read
    ReadAll,
}

#[derive(Args)]
pub struct MoveArgs {
    pub id: WorkOrderId,

    /// Target stage (Entrada, Reparación, Salida)
    #[arg(long, value_parser = parse_stage)]
    pub stage: Stage,

    /// Target sub-state (CHEQUEO, REPARACION, TERMINADO)
    #[arg(long, value_parser = parse_sub_state)]
    pub sub_state: Option<SubState>,

    /// Technician user id
    #[arg(long)]
    pub technician: Option<UserId>,
}

fn parse_stage(value: &str) -> Result<Stage, String> {
    Stage::parse(value).ok_or_else(|| format!("unknown stage '{value}'"))
}

fn parse_sub_state(value: &str) -> Result<SubState, String> {
    SubState::parse(value).ok_or_else(|| format!("unknown sub-state '{value}'"))
}

fn parse_priority(value: &str) -> Result<Priority, String> {
    Priority::parse(value).ok_or_else(|| format!("unknown priority '{value}'"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("warn,taller_application=info,taller_infrastructure=info,taller_cli=info")
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = commands::load_config(cli.config.as_deref(), cli.api_url.as_deref())?;
    let console = commands::build_console(&config)?;

    let identity = commands::session::connect(&console, &cli.auth).await?;

    match cli.command {
        Commands::Whoami => commands::session::whoami(&identity),
        Commands::Logout => commands::session::logout(&console).await?,
        Commands::Board(args) => commands::board::show(&console, args).await?,
        Commands::Notifications { action } => match action {
            NotificationAction::List { unread } => {
                commands::notifications::list(&console, unread).await?
            }
            NotificationAction::Read { id } => commands::notifications::read(&console, id).await?,
            NotificationAction::ReadAll => commands::notifications::read_all(&console).await?,
        },
        Commands::Move(args) => commands::transition::move_order(&console, args).await?,
        Commands::Watch => commands::watch::run(&console).await?,
    }

    Ok(())
}
