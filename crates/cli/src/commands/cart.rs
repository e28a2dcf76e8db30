//! Cart commands.

use bookstore_storefront::Storefront;
use bookstore_storefront::services::QuantityChange;

use super::CliError;
use crate::CartAction;
use crate::terminal;

/// Show or edit the cart, then re-render it.
pub fn run(page: &mut Storefront, action: Option<CartAction>) -> Result<(), CliError> {
    let change = match action.unwrap_or(CartAction::Show) {
        CartAction::Show => None,
        CartAction::Inc { id } => Some((id, page.change_quantity(id, 1)?)),
        CartAction::Dec { id } => Some((id, page.change_quantity(id, -1)?)),
        CartAction::Qty { id, delta } => Some((id, page.change_quantity(id, delta)?)),
        CartAction::Remove { id } => {
            page.remove_from_cart(id)?;
            None
        }
        CartAction::Clear => {
            page.clear_cart()?;
            None
        }
    };

    if let Some((id, QuantityChange::NotFound)) = change {
        tracing::info!(product_id = %id, "No cart line for product");
    }

    render(page)
}

/// Print the badge alone.
pub fn badge(page: &Storefront) -> Result<(), CliError> {
    terminal::print_view(&page.render_badge()?);
    Ok(())
}

fn render(page: &Storefront) -> Result<(), CliError> {
    terminal::print_view(&page.render_cart()?);
    terminal::print_view(&page.render_badge()?);
    Ok(())
}
