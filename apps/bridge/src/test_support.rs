//! Fixtures for the command tests.

use std::sync::Arc;

use tally_core::Sale;
use tally_db::MemoryKvStore;

use crate::commands::sale::{self, SelectCustomerArgs, SetProductArgs, SetQuantityArgs};
use crate::state::{AppState, BridgeConfig};

/// A session over an in-memory store holding the sample catalog.
pub async fn seeded_state() -> (AppState, Arc<MemoryKvStore>) {
    let kv = Arc::new(MemoryKvStore::new());
    let app = AppState::open(BridgeConfig::default(), kv.clone()).await;
    (app, kv)
}

pub fn product_id(app: &AppState, name: &str) -> String {
    app.store
        .products()
        .iter()
        .find(|p| p.name == name)
        .map(|p| p.id.clone())
        .unwrap_or_else(|| panic!("no sample product named {name}"))
}

/// Sells `quantity` of `product` to the first customer at list price.
pub async fn complete_sale_of(app: &mut AppState, product: &str, quantity: i64) -> Sale {
    let product_id = product_id(app, product);
    let customer_id = app.store.customers()[0].id.clone();

    sale::set_line_product(
        app,
        SetProductArgs {
            index: 0,
            product_id,
        },
    );
    sale::set_line_quantity(app, SetQuantityArgs { index: 0, quantity }).unwrap();
    sale::select_customer(app, SelectCustomerArgs { customer_id });
    let sale = sale::complete_sale(app).await.unwrap();

    app.take_notices();
    sale
}
