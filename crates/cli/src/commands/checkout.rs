//! Checkout command.

use bookstore_storefront::Storefront;
use bookstore_storefront::services::{CheckoutDetails, CheckoutOutcome};

use super::CliError;
use crate::terminal::{self, TerminalNotifier};

/// Place an order for the cart.
///
/// The page announces every outcome itself; this prints the receipt on
/// success and the refreshed badge either way.
pub async fn run(
    page: &mut Storefront,
    notifier: &TerminalNotifier,
    yes: bool,
    details: &CheckoutDetails,
) -> Result<(), CliError> {
    notifier.set_assume_yes(yes);
    let outcome = page.checkout(details).await;
    notifier.set_assume_yes(false);

    match outcome {
        CheckoutOutcome::Placed(receipt) => {
            terminal::print_view(&page.render_receipt(&receipt)?);
            terminal::print_view(&page.render_badge()?);
            Ok(())
        }
        CheckoutOutcome::Declined => Ok(()),
        CheckoutOutcome::EmptyCart
        | CheckoutOutcome::NotLoggedIn
        | CheckoutOutcome::SessionCheckFailed
        | CheckoutOutcome::Rejected(_)
        | CheckoutOutcome::Failed => Err(CliError::Announced),
    }
}
