//! Command handlers.
//!
//! Each handler runs one storefront operation on an open page and prints
//! the views it affects. Cart changes always re-render the cart and badge.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod shell;

use bookstore_storefront::{AppError, Storefront};
use thiserror::Error;

use crate::Commands;
use crate::terminal::{self, TerminalNotifier};

/// Errors that can end a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// A storefront operation failed.
    #[error(transparent)]
    App(#[from] AppError),

    /// Reading from or writing to the terminal failed.
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),

    /// The shell's line editor failed.
    #[error("line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    /// The command cannot be carried out as given.
    #[error("{0}")]
    Usage(String),

    /// The page already told the user what went wrong.
    #[error("command did not complete")]
    Announced,
}

impl CliError {
    /// Log the error and tell the user, unless the page already has.
    pub fn report(&self) {
        match self {
            Self::App(err) => {
                err.report();
                terminal::print_error(&err.user_message());
            }
            Self::Io(err) => {
                tracing::error!(error = %err, "Terminal I/O failed");
                terminal::print_error(&self.to_string());
            }
            Self::Readline(err) => {
                tracing::error!(error = %err, "Line editor failed");
                terminal::print_error(&self.to_string());
            }
            Self::Usage(message) => terminal::print_error(message),
            Self::Announced => {}
        }
    }
}

/// Run one non-shell command.
pub async fn dispatch(
    page: &mut Storefront,
    notifier: &TerminalNotifier,
    command: Commands,
) -> Result<(), CliError> {
    match command {
        Commands::Products { search, refresh } => catalog::products(page, &search, refresh).await,
        Commands::Add { id } => catalog::add(page, id).await,
        Commands::Cart { action } => cart::run(page, action),
        Commands::Badge => cart::badge(page),
        Commands::Checkout {
            yes,
            name,
            email,
            phone,
            address,
        } => {
            let details = bookstore_storefront::services::CheckoutDetails {
                customer_name: name,
                customer_email: email,
                customer_phone: phone,
                shipping_address: address,
            };
            checkout::run(page, notifier, yes, &details).await
        }
        Commands::Login { email } => account::login(page, &email).await,
        Commands::Register { name, email } => account::register(page, &name, &email).await,
        Commands::Logout => account::logout(page).await,
        Commands::Whoami => account::whoami(page),
        Commands::Shell => Err(CliError::Usage(
            "already in a shell; type `exit` to leave".to_string(),
        )),
    }
}
