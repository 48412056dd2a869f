//! CLI Commands Module
//!
//! Command-line surface over [`ApiClient`]. Results are printed to stdout as
//! pretty JSON; diagnostics go to the log.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::config::{ClientConfig, API_URL_ENV, STORAGE_DIR_ENV, TIMEOUT_ENV};
use crate::models::{CreditSpreadInput, FeedbackInput, FeedbackStatus, FeedbackType, PositionInput, RegisterRequest};
use crate::navigation::LogNavigator;
use crate::storage::SecureStorage;

#[derive(Parser, Debug)]
#[command(name = "wheeltracker", about = "WheelTracker API client", version)]
pub struct Cli {
    /// API origin, e.g. http://localhost:8000/api
    #[arg(long, env = API_URL_ENV)]
    pub api_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = TIMEOUT_ENV)]
    pub timeout_secs: Option<u64>,

    /// Where session tokens are kept
    #[arg(long, env = STORAGE_DIR_ENV)]
    pub storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Store an issued token pair
    Login {
        #[arg(long)]
        access: String,
        #[arg(long)]
        refresh: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        username: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        password_confirm: String,
    },
    Logout,
    /// Exchange the refresh token for a new access token
    Refresh,
    /// Show whether a session is stored
    Session,
    Whoami,
    Positions(PositionsCommand),
    Spreads(SpreadsCommand),
    Feedback(FeedbackCommand),
}

#[derive(Args, Debug)]
pub struct PositionsCommand {
    #[command(subcommand)]
    pub command: PositionsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum PositionsSubcommand {
    List,
    Get {
        id: i64,
    },
    /// Create from a JSON file
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    /// Replace from a JSON file
    Update {
        id: i64,
        #[arg(long)]
        file: PathBuf,
    },
    Delete {
        id: i64,
    },
    Summary,
    ByStock {
        #[arg(long)]
        stock: Option<String>,
    },
    /// Refresh the option price of one position
    Price {
        id: i64,
    },
    /// Refresh option prices of every open position
    Prices,
    Roi {
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
    },
}

#[derive(Args, Debug)]
pub struct SpreadsCommand {
    #[command(subcommand)]
    pub command: SpreadsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum SpreadsSubcommand {
    List,
    Get {
        id: i64,
    },
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    Update {
        id: i64,
        #[arg(long)]
        file: PathBuf,
    },
    Delete {
        id: i64,
    },
    Summary,
    ByStock {
        #[arg(long)]
        stock: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct FeedbackCommand {
    #[command(subcommand)]
    pub command: FeedbackSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum FeedbackSubcommand {
    List,
    Get {
        id: i64,
    },
    Submit {
        /// bug, feature or other
        #[arg(long = "type", value_parser = parse_enum::<FeedbackType>)]
        feedback_type: FeedbackType,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        description: String,
    },
    /// Set the status of a feedback item (admin)
    Status {
        id: i64,
        /// new, in_progress, completed or closed
        #[arg(value_parser = parse_enum::<FeedbackStatus>)]
        status: FeedbackStatus,
    },
}

/// Resolve the effective configuration. clap has already folded the
/// environment into the flags; anything unset keeps its default.
pub fn resolve_config(cli: &Cli) -> ClientConfig {
    let mut config = ClientConfig::default();
    if let Some(url) = &cli.api_url {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(secs) = cli.timeout_secs.filter(|s| *s > 0) {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if let Some(dir) = &cli.storage_dir {
        config = config.with_storage_dir(dir);
    }
    config
}

/// Build the client, restore any stored session and run the command
pub async fn run(cli: Cli, config: ClientConfig) -> anyhow::Result<()> {
    debug!("Using API at {}", config.base_url);

    let storage = Arc::new(SecureStorage::at(&config.storage_dir));
    let api = ApiClient::new(config, storage, Arc::new(LogNavigator)).context("failed to create API client")?;
    api.auth().init();

    match cli.command {
        Command::Login { access, refresh } => {
            api.auth().login(&access, &refresh);
            print_json(&json!({ "success": true }))
        }
        Command::Register {
            username,
            email,
            password,
            password_confirm,
        } => {
            let response = api
                .register(&RegisterRequest {
                    username,
                    email,
                    password,
                    password_confirm,
                })
                .await?;
            print_json(&json!({
                "message": response.message,
                "user": { "id": response.user.id, "username": response.user.username, "email": response.user.email },
            }))
        }
        Command::Logout => {
            api.auth().logout();
            print_json(&json!({ "success": true }))
        }
        Command::Refresh => {
            if !api.auth().refresh_access_token().await {
                bail!("token refresh failed, sign in again");
            }
            print_json(&json!({ "success": true }))
        }
        Command::Session => print_json(&json!({ "is_authenticated": api.auth().is_authenticated() })),
        Command::Whoami => {
            let user = api.current_user().await?;
            let is_admin = user.is_admin();
            print_json(&json!({
                "id": user.id,
                "username": user.username,
                "email": user.email,
                "is_admin": is_admin,
            }))
        }
        Command::Positions(cmd) => print_json(&positions(&api, cmd.command).await?),
        Command::Spreads(cmd) => print_json(&spreads(&api, cmd.command).await?),
        Command::Feedback(cmd) => print_json(&feedback(&api, cmd.command).await?),
    }
}

async fn positions(api: &ApiClient, command: PositionsSubcommand) -> anyhow::Result<Value> {
    let value = match command {
        PositionsSubcommand::List => api.get_positions().await?,
        PositionsSubcommand::Get { id } => api.get_position(id).await?,
        PositionsSubcommand::Create { file } => {
            let input: PositionInput = read_json(&file)?;
            api.create_position(&input).await?
        }
        PositionsSubcommand::Update { id, file } => {
            let input: PositionInput = read_json(&file)?;
            api.update_position(id, &input).await?
        }
        PositionsSubcommand::Delete { id } => api.delete_position(id).await?,
        PositionsSubcommand::Summary => api.get_summary().await?,
        PositionsSubcommand::ByStock { stock } => api.get_by_stock(stock.as_deref()).await?,
        PositionsSubcommand::Price { id } => api.fetch_current_price(id).await?,
        PositionsSubcommand::Prices => api.fetch_all_current_prices().await?,
        PositionsSubcommand::Roi { start, end } => api.get_roi_summary(start, end).await?,
    };
    Ok(value)
}

async fn spreads(api: &ApiClient, command: SpreadsSubcommand) -> anyhow::Result<Value> {
    let value = match command {
        SpreadsSubcommand::List => api.get_credit_spreads().await?,
        SpreadsSubcommand::Get { id } => api.get_credit_spread(id).await?,
        SpreadsSubcommand::Create { file } => {
            let input: CreditSpreadInput = read_json(&file)?;
            api.create_credit_spread(&input).await?
        }
        SpreadsSubcommand::Update { id, file } => {
            let input: CreditSpreadInput = read_json(&file)?;
            api.update_credit_spread(id, &input).await?
        }
        SpreadsSubcommand::Delete { id } => api.delete_credit_spread(id).await?,
        SpreadsSubcommand::Summary => api.get_credit_spread_summary().await?,
        SpreadsSubcommand::ByStock { stock } => api.get_credit_spreads_by_stock(stock.as_deref()).await?,
    };
    Ok(value)
}

async fn feedback(api: &ApiClient, command: FeedbackSubcommand) -> anyhow::Result<Value> {
    let value = match command {
        FeedbackSubcommand::List => api.get_feedback().await?,
        FeedbackSubcommand::Get { id } => api.get_feedback_item(id).await?,
        FeedbackSubcommand::Submit {
            feedback_type,
            subject,
            description,
        } => {
            if subject.trim().is_empty() || description.trim().is_empty() {
                bail!("subject and description are required");
            }
            api.submit_feedback(&FeedbackInput {
                feedback_type,
                subject,
                description,
            })
            .await?
        }
        FeedbackSubcommand::Status { id, status } => {
            info!("Setting feedback {} to {:?}", id, status);
            api.update_feedback_status(id, status).await?
        }
    };
    Ok(value)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parse a snake_case enum the same way the API spells it
fn parse_enum<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    serde_json::from_value(Value::String(raw.to_string())).map_err(|_| format!("unsupported value: {}", raw))
}
