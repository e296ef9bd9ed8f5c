//! xonweb main entry point

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use xonweb_client::{clear_all, ApiClient, AuthService, ClientError, ItemStatusSync, SessionStore};
use xonweb_config::{Config, ConfigError, CurrencyConfig, LogLevel};
use xonweb_core::navigation::NavigationView;
use xonweb_core::{
    suggestions, Category, CoreError, FormAction, ItemStatus, LineItemField, RoleSet, TaskStatus,
    TransactionForm, User, WorkReportInput,
};
use xonweb_utils::format_currency;

#[derive(Parser, Debug)]
#[command(name = "xonweb")]
#[command(version = "0.1.0")]
#[command(about = "Command line front end for the XON construction project API", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default configuration file
    Init,
    /// Log in with email or username, or with an identity provider session
    Login {
        #[arg(long, required_unless_present = "google_session")]
        user: Option<String>,
        #[arg(long, required_unless_present = "google_session")]
        password: Option<String>,
        #[arg(long)]
        google_session: Option<String>,
    },
    Logout,
    /// Show the logged in user and their roles
    Whoami,
    /// Show the navigation menu for a path
    Menu {
        #[arg(long, default_value = "/")]
        path: String,
        /// Comma separated roles to use instead of the logged in user's
        #[arg(long, value_delimiter = ',')]
        roles: Option<Vec<String>>,
    },
    #[command(subcommand)]
    Transactions(TransactionCommand),
    #[command(subcommand)]
    Tasks(TaskCommand),
    /// Autocomplete from known item names or suppliers
    Suggest {
        #[arg(value_enum)]
        source: SuggestSource,
        input: String,
        #[arg(long)]
        project_type: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum TransactionCommand {
    List,
    /// Create a transaction
    Add {
        #[arg(long)]
        project: String,
        /// kas_masuk, bahan, upah, alat, vendor, operasional, aset or hutang
        #[arg(long, default_value = "kas_masuk", value_parser = Category::parse_selectable)]
        category: Category,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        quantity: Option<String>,
        #[arg(long)]
        unit: Option<String>,
        /// Asset condition
        #[arg(long)]
        status: Option<String>,
        /// Material row as `description:unit_price:quantity:unit`
        #[arg(long = "item")]
        items: Vec<String>,
        #[arg(long)]
        supplier: Option<String>,
        /// Receipt image to attach
        #[arg(long)]
        receipt: Option<PathBuf>,
        /// Transaction date, YYYY-MM-DD
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
    },
    /// Move a material row between receiving and out_warehouse
    ItemStatus {
        id: String,
        index: usize,
        status: ItemStatus,
    },
    /// Delete every transaction
    ClearAll {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// Tasks assigned to the logged in user
    List,
    Status { id: String, status: TaskStatus },
    /// Submit a work report; progress is 0 to 100
    Report { id: String, progress: String, text: String },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum SuggestSource {
    Items,
    Suppliers,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match load_config(&args.config).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.to_details());
            std::process::exit(2);
        }
    };
    init_logging(config.logging.level);
    log::debug!(target: "xonweb::cli", "using API at {}", config.api.base_url);

    if let Err(e) = run(args, config).await {
        eprintln!("{}", error_report(&e));
        std::process::exit(1);
    }
}

/// Text printed for a failed command
fn error_report(error: &anyhow::Error) -> String {
    if let Some(client_error) = error.downcast_ref::<ClientError>() {
        log::debug!(target: "xonweb::cli", "{}", client_error);
        return client_error.to_details().to_string();
    }
    if let Some(core_error) = error.downcast_ref::<CoreError>() {
        return core_error.to_details().to_string();
    }
    format!("Error: {:#}", error)
}

/// A missing configuration file means defaults
async fn load_config(path: &Path) -> Result<Config, ConfigError> {
    match Config::load_async(path).await {
        Err(ConfigError::FileNotFound { .. }) => Ok(Config::default()),
        other => other,
    }
}

/// `RUST_LOG` wins over the configured level
fn init_logging(level: LogLevel) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.to_string()))
        .init();
}

async fn run(args: Args, config: Config) -> anyhow::Result<()> {
    if let Command::Init = args.command {
        if args.config.exists() {
            bail!("{} already exists", args.config.display());
        }
        tokio::fs::write(&args.config, Config::generate_default())
            .await
            .with_context(|| format!("writing {}", args.config.display()))?;
        println!("Wrote {}", args.config.display());
        return Ok(());
    }

    let session = Arc::new(SessionStore::open(&config.session.path).await?);
    let api = ApiClient::new(&config.api, session)?;
    let auth = AuthService::new(api.clone());

    match args.command {
        Command::Init => Ok(()),
        Command::Login {
            user,
            password,
            google_session,
        } => {
            let user = match google_session {
                Some(session_id) => auth.login_with_google(&session_id).await?,
                None => {
                    auth.login(
                        user.as_deref().unwrap_or_default(),
                        password.as_deref().unwrap_or_default(),
                    )
                    .await?
                }
            };
            println!("Logged in as {} <{}>", user.name, user.email);
            Ok(())
        }
        Command::Logout => {
            auth.logout().await?;
            println!("Logged out");
            Ok(())
        }
        Command::Whoami => {
            let user = require_user(&auth).await?;
            let roles: Vec<String> = user.role_set().iter().map(|r| r.to_string()).collect();
            println!("{} <{}>", user.name, user.email);
            println!("roles: {}", if roles.is_empty() { "-".to_string() } else { roles.join(", ") });
            Ok(())
        }
        Command::Menu { path, roles } => {
            let roles = match roles {
                Some(names) => RoleSet::parse_list(names.iter().map(String::as_str))?,
                None => auth
                    .restore()
                    .await?
                    .map(|user| user.role_set())
                    .unwrap_or_default(),
            };
            print_menu(&NavigationView::build(&roles, &path));
            Ok(())
        }
        Command::Transactions(command) => run_transactions(command, &api, &config).await,
        Command::Tasks(command) => run_tasks(command, &api, &auth).await,
        Command::Suggest {
            source,
            input,
            project_type,
        } => {
            let known = match source {
                SuggestSource::Items => {
                    api.item_names(Some(&Category::Bahan), project_type.as_deref())
                        .await?
                }
                SuggestSource::Suppliers => api.suppliers().await?,
            };
            for name in suggestions(&known, &input) {
                println!("{}", name);
            }
            Ok(())
        }
    }
}

async fn require_user(auth: &AuthService) -> anyhow::Result<User> {
    match auth.restore().await? {
        Some(user) => Ok(user),
        None => Err(ClientError::Unauthorized.into()),
    }
}

fn print_menu(view: &NavigationView) {
    println!("{}", view.title);
    for item in &view.items {
        let marker = if item.active { "*" } else { " " };
        println!("{} {:<12} {}", marker, item.entry.label, item.entry.path);
    }
}

fn money(amount: Decimal, currency: &CurrencyConfig) -> String {
    format_currency(
        amount,
        &currency.symbol,
        &currency.thousands_separator,
        &currency.decimal_separator,
        currency.decimal_places,
    )
}

// ==================== Transactions ====================

async fn run_transactions(
    command: TransactionCommand,
    api: &ApiClient,
    config: &Config,
) -> anyhow::Result<()> {
    match command {
        TransactionCommand::List => {
            let transactions = api.transactions().await?;
            let mut balance = Decimal::ZERO;
            for tx in &transactions {
                balance += tx.signed_amount();
                let date = tx
                    .transaction_time()
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                println!(
                    "{}  {:<10}  {:<12}  {:>18}  {}",
                    tx.id,
                    date,
                    tx.category.label(),
                    money(tx.signed_amount(), &config.currency),
                    tx.description
                );
                for (index, item) in tx.items().iter().enumerate() {
                    println!(
                        "    [{}] {} {} {} x {} = {} ({})",
                        index,
                        item.description,
                        item.quantity,
                        item.unit,
                        money(item.unit_price, &config.currency),
                        money(item.total, &config.currency),
                        item.status()
                    );
                }
            }
            println!("{} transactions, balance {}", transactions.len(), money(balance, &config.currency));
            Ok(())
        }
        TransactionCommand::Add {
            project,
            category,
            description,
            amount,
            quantity,
            unit,
            status,
            items,
            supplier,
            receipt,
            date,
        } => {
            let mut form = TransactionForm::default()
                .apply(FormAction::SetProject(project))
                .set_category(category)
                .apply(FormAction::SetDescription(description));
            if let Some(date) = date {
                form = form.apply(FormAction::SetDate(date));
            }
            let optional = [
                amount.map(FormAction::SetAmount),
                quantity.map(FormAction::SetQuantity),
                unit.map(FormAction::SetUnit),
                status.map(FormAction::SetStatus),
                supplier.map(FormAction::SetSupplier),
            ];
            for action in optional.into_iter().flatten() {
                form = form.apply(action);
            }
            for (index, row) in items.iter().enumerate() {
                if index > 0 {
                    form = form.add_line_item();
                }
                form = apply_item_arg(form, index, row)?;
            }
            if let Some(path) = receipt {
                let bytes = tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("reading {}", path.display()))?;
                form = form
                    .attach_receipt(&bytes, mime_for(&path), config.receipts.max_bytes)
                    .map_err(CoreError::from)?;
            }

            let submission = form.build_submission().map_err(CoreError::from)?;
            let response = api.create_transaction(&submission).await?;
            println!(
                "{} {}",
                response.message,
                response.id.as_deref().unwrap_or_default()
            );
            Ok(())
        }
        TransactionCommand::ItemStatus { id, index, status } => {
            let sync = ItemStatusSync::new(Arc::new(api.clone()));
            sync.reload().await?;
            let transactions = sync.update_item_status(&id, index, status).await?;
            let shown = transactions
                .iter()
                .find(|tx| tx.id == id)
                .and_then(|tx| tx.items().get(index))
                .map(|item| item.status().to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("{}[{}] is now {}", id, index, shown);
            Ok(())
        }
        TransactionCommand::ClearAll { yes } => {
            if !yes {
                bail!("refusing to delete every transaction without --yes");
            }
            let transactions = api.transactions().await?;
            let remaining = clear_all(api, &transactions).await?;
            println!(
                "Deleted {} transactions, {} remaining",
                transactions.len(),
                remaining.len()
            );
            Ok(())
        }
    }
}

/// Fill row `index` from `description:unit_price:quantity:unit`
fn apply_item_arg(form: TransactionForm, index: usize, row: &str) -> anyhow::Result<TransactionForm> {
    let parts: Vec<&str> = row.split(':').collect();
    if parts.len() < 3 || parts.len() > 4 {
        bail!("invalid item {:?}, expected description:unit_price:quantity[:unit]", row);
    }
    let fields = [
        LineItemField::Description,
        LineItemField::UnitPrice,
        LineItemField::Quantity,
        LineItemField::Unit,
    ];
    Ok(fields
        .iter()
        .zip(parts)
        .fold(form, |form, (field, value)| form.set_line_item(index, *field, value)))
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

// ==================== Tasks ====================

async fn run_tasks(command: TaskCommand, api: &ApiClient, auth: &AuthService) -> anyhow::Result<()> {
    match command {
        TaskCommand::List => {
            let user = require_user(auth).await?;
            for task in api.tasks(Some(&user.id)).await? {
                println!(
                    "{}  {:<12}  {:<6}  {}  {}",
                    task.id,
                    task.status.to_string(),
                    task.priority.to_string(),
                    task.due_date.as_deref().unwrap_or("-"),
                    task.title
                );
            }
            Ok(())
        }
        TaskCommand::Status { id, status } => {
            api.update_task_status(&id, status).await?;
            println!("{} is now {}", id, status);
            Ok(())
        }
        TaskCommand::Report { id, progress, text } => {
            let report = WorkReportInput::new(&id, &text, &progress).map_err(CoreError::from)?;
            api.submit_report(&report).await?;
            println!("Report submitted for {} ({}%)", id, report.progress);
            Ok(())
        }
    }
}
