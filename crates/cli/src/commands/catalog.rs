//! Catalog commands.

use bookstore_core::ProductId;
use bookstore_storefront::Storefront;

use super::CliError;
use crate::terminal;

/// List the catalog, filtered by `search`.
pub async fn products(page: &mut Storefront, search: &str, refresh: bool) -> Result<(), CliError> {
    if refresh {
        page.refresh_catalog().await;
    } else {
        page.load_catalog().await;
    }
    terminal::print_view(&page.render_products(search)?);
    Ok(())
}

/// Add one unit of catalog product `id`.
pub async fn add(page: &mut Storefront, id: ProductId) -> Result<(), CliError> {
    page.load_catalog().await;
    if page.add_to_cart_from_catalog(id)?.is_none() {
        return Err(CliError::Usage(format!("no product with id {id}")));
    }
    terminal::print_view(&page.render_badge()?);
    Ok(())
}
