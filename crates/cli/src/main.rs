//! Layercraft CLI - catalog and back-office tools.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! lc-cli products list --category Planters
//! lc-cli products show 65a1f0c2d4e5f6a7b8c9d0e1f2a3b4c5
//!
//! # Seed products from a YAML file (needs APPWRITE_API_KEY)
//! lc-cli products seed crates/cli/seed/products.yaml
//!
//! # Review custom requests and orders (needs APPWRITE_API_KEY)
//! lc-cli requests list
//! lc-cli requests set-status <ID> approved
//! lc-cli orders set-status <ID> shipped
//!
//! # Accounts
//! lc-cli account signup -e ada@example.com -p 'correct horse' -n "Ada"
//! lc-cli account whoami -e ada@example.com -p 'correct horse'
//!
//! # Admin dashboard
//! lc-cli dashboard -e admin@example.com -p 'correct horse'
//! ```
//!
//! Configuration comes from the environment (and `.env`); see
//! `layercraft_storefront::config`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use layercraft_storefront::Storefront;
use layercraft_storefront::config::StorefrontConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "lc-cli")]
#[command(author, version, about = "Layercraft CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and seed the catalog
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Review custom requests
    Requests {
        #[command(subcommand)]
        action: RequestAction,
    },
    /// Review orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Create or inspect accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Show the admin dashboard
    Dashboard {
        #[command(flatten)]
        login: Login,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List products
    List {
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,

        /// Case-insensitive match on name or description
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one product
    Show {
        /// Product ID
        id: String,
    },
    /// Create products from a YAML file
    Seed {
        /// Path to the YAML file
        file: String,
    },
}

#[derive(Subcommand)]
enum RequestAction {
    /// List custom requests
    List {
        /// Only requests from this account ID
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Change a request's status (`pending`, `reviewed`, `approved`, `rejected`)
    SetStatus { id: String, status: String },
}

#[derive(Subcommand)]
enum OrderAction {
    /// List orders
    List {
        /// Only orders from this account ID
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Change an order's status (`pending`, `processing`, `shipped`, `delivered`, `cancelled`)
    SetStatus { id: String, status: String },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Create an account and its profile
    Signup {
        #[command(flatten)]
        login: Login,

        /// Display name
        #[arg(short, long, default_value = "")]
        name: String,
    },
    /// Log in and show the resolved user
    Whoami {
        #[command(flatten)]
        login: Login,
    },
}

#[derive(clap::Args)]
struct Login {
    /// Account email
    #[arg(short, long)]
    email: String,

    /// Account password
    #[arg(short, long, env = "LAYERCRAFT_PASSWORD", hide_env_values = true)]
    password: String,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "layercraft_storefront=info,layercraft_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), CliError> {
    let storefront = Storefront::new(config)?;

    match cli.command {
        Commands::Products { action } => match action {
            ProductAction::List { category, search } => {
                commands::products::list(&storefront, category, search).await?;
            }
            ProductAction::Show { id } => commands::products::show(&storefront, &id).await?,
            ProductAction::Seed { file } => commands::products::seed(&storefront, &file).await?,
        },
        Commands::Requests { action } => match action {
            RequestAction::List { user } => {
                commands::requests::list(&storefront, user.as_deref()).await?;
            }
            RequestAction::SetStatus { id, status } => {
                commands::requests::set_status(&storefront, &id, &status).await?;
            }
        },
        Commands::Orders { action } => match action {
            OrderAction::List { user } => {
                commands::orders::list(&storefront, user.as_deref()).await?;
            }
            OrderAction::SetStatus { id, status } => {
                commands::orders::set_status(&storefront, &id, &status).await?;
            }
        },
        Commands::Account { action } => match action {
            AccountAction::Signup { login, name } => {
                commands::account::signup(&storefront, &login.email, &login.password, &name)
                    .await?;
            }
            AccountAction::Whoami { login } => {
                commands::account::whoami(&storefront, &login.email, &login.password).await?;
            }
        },
        Commands::Dashboard { login } => {
            commands::dashboard::show(storefront, &login.email, &login.password).await?;
        }
    }
    Ok(())
}
