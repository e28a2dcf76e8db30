//! Account commands.
//!
//! # Environment Variables
//!
//! - `BOOKSTORE_PASSWORD` - Password for `login` and `register`; prompted
//!   for without echo when unset

use std::io;

use bookstore_storefront::Storefront;
use bookstore_storefront::models::SessionState;
use secrecy::SecretString;

use super::CliError;
use crate::terminal;

const PASSWORD_ENV: &str = "BOOKSTORE_PASSWORD";

/// Sign in as `email`.
pub async fn login(page: &mut Storefront, email: &str) -> Result<(), CliError> {
    let password = read_password()?;
    page.login(email, &password)
        .await
        .map_err(|_| CliError::Announced)?;
    terminal::print_view(&page.render_nav()?);
    Ok(())
}

/// Create an account and sign in.
pub async fn register(page: &mut Storefront, name: &str, email: &str) -> Result<(), CliError> {
    let password = read_password()?;
    page.register(name, email, &password)
        .await
        .map_err(|_| CliError::Announced)?;
    terminal::print_view(&page.render_nav()?);
    Ok(())
}

/// Sign out.
pub async fn logout(page: &mut Storefront) -> Result<(), CliError> {
    page.logout().await.map_err(|_| CliError::Announced)?;
    terminal::print_view(&page.render_nav()?);
    Ok(())
}

/// Show the navigation bar for the current session.
pub fn whoami(page: &Storefront) -> Result<(), CliError> {
    if *page.session() == SessionState::Unknown {
        return Err(CliError::Usage(
            "could not reach the bookstore to check your session".to_string(),
        ));
    }
    terminal::print_view(&page.render_nav()?);
    Ok(())
}

fn read_password() -> Result<SecretString, CliError> {
    password_from(std::env::var(PASSWORD_ENV).ok(), || {
        rpassword::prompt_password("Password: ")
    })
}

/// The environment value if set, otherwise whatever `prompt` reads.
fn password_from(
    env: Option<String>,
    prompt: impl FnOnce() -> io::Result<String>,
) -> Result<SecretString, CliError> {
    let password = match env {
        Some(password) => password,
        None => prompt()?,
    };
    Ok(SecretString::from(password))
}
