//! Bookstore CLI - a terminal storefront.
//!
//! # Usage
//!
//! ```bash
//! # Browse and search the catalog
//! bookstore products
//! bookstore products --search tolstoy
//!
//! # Fill the cart
//! bookstore add 3
//! bookstore cart inc 3
//! bookstore cart qty 3 -2
//!
//! # Sign in and order
//! BOOKSTORE_PASSWORD=secret bookstore login reader@example.com
//! bookstore checkout --phone "+7 900 000-00-00" --address "Moscow"
//!
//! # Keep one page open for many commands
//! bookstore shell
//! ```
//!
//! # Commands
//!
//! - `products` - List or search the catalog
//! - `add` - Add a catalog product to the cart
//! - `cart` - Show or edit the cart
//! - `badge` - Print the cart badge
//! - `checkout` - Place an order for the cart
//! - `login` / `register` / `logout` / `whoami` - Account
//! - `shell` - Interactive session on one page

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;
use std::sync::Arc;

use bookstore_core::ProductId;
use bookstore_storefront::{AppError, Storefront};
use bookstore_storefront::config::StorefrontConfig;
use bookstore_storefront::services::CartStore;
use bookstore_storefront::storage::FileStorage;
use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod terminal;

use commands::CliError;
use terminal::TerminalNotifier;

#[derive(Parser)]
#[command(name = "bookstore")]
#[command(author, version, about = "Bookstore storefront in your terminal")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the catalog, optionally filtered
    Products {
        /// Case-insensitive text matched against name and description
        #[arg(short, long, default_value = "")]
        search: String,

        /// Bypass the cached listing
        #[arg(long)]
        refresh: bool,
    },
    /// Add one unit of a catalog product to the cart
    Add {
        /// Product id as shown by `products`
        id: ProductId,
    },
    /// Show or edit the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Print the cart badge (total quantity)
    Badge,
    /// Place an order for everything in the cart
    Checkout {
        /// Confirm without asking
        #[arg(short, long)]
        yes: bool,

        /// Name for the order (defaults to the account name)
        #[arg(long)]
        name: Option<String>,

        /// Contact email (defaults to the account email)
        #[arg(long)]
        email: Option<String>,

        /// Contact phone
        #[arg(long)]
        phone: Option<String>,

        /// Shipping address
        #[arg(long)]
        address: Option<String>,
    },
    /// Sign in (password from `BOOKSTORE_PASSWORD` or prompted)
    Login {
        email: String,
    },
    /// Create an account (password from `BOOKSTORE_PASSWORD` or prompted)
    Register {
        name: String,
        email: String,
    },
    /// Sign out
    Logout,
    /// Show who is signed in
    Whoami,
    /// Run commands interactively against one page
    Shell,
}

#[derive(Debug, Subcommand)]
pub enum CartAction {
    /// Show the cart (default)
    Show,
    /// Add one to a line
    Inc { id: ProductId },
    /// Take one from a line; a line at zero is removed
    Dec { id: ProductId },
    /// Change a line's quantity by DELTA
    Qty {
        id: ProductId,
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Remove a line
    Remove { id: ProductId },
    /// Empty the cart
    Clear,
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
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            terminal::print_error(&e.to_string());
            return ExitCode::from(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr; stdout belongs to the rendered views
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bookstore_storefront=info,bookstore=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    match run(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), CliError> {
    // `cart clear` is also the way out of an unreadable saved cart, which
    // would otherwise stop the page from opening.
    if matches!(
        cli.command,
        Commands::Cart {
            action: Some(CartAction::Clear)
        }
    ) {
        let storage = FileStorage::open(&config.profile_dir).map_err(AppError::from)?;
        CartStore::discard(&storage).map_err(AppError::from)?;
    }

    let notifier = Arc::new(TerminalNotifier::new());
    let mut page = Storefront::open_profile(config, notifier.clone()).await?;

    match cli.command {
        Commands::Shell => commands::shell::run(&mut page, &notifier, &config.profile_dir).await,
        command => commands::dispatch(&mut page, &notifier, command).await,
    }
}
