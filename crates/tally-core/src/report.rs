//! # Report Aggregator
//!
//! Read-only projections over the [`Store`]. Every function here is pure:
//! calling it twice on the same store gives the same answer.
//!
//! ```text
//! Store ──► dashboard_stats ──► DashboardStats
//!       ──► daily_sales ──────► DailySales (one row per sale)
//!       ──► stock_report ─────► StockReport (All | Low | Out)
//!       ──► search_products ──► Vec<&Product>
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::stock::{self, StockStatus};
use crate::store::Store;
use crate::types::{Product, Sale};

/// How many low-stock products the dashboard lists.
pub const DASHBOARD_LOW_STOCK_LIMIT: usize = 5;

// =============================================================================
// Dashboard
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_products: usize,
    pub total_customers: usize,
    /// Products that are out of stock or at/below their threshold.
    pub low_stock_count: usize,
    /// First five of those, in catalog order.
    pub low_stock_products: Vec<Product>,
    /// Σ stock × reference price.
    pub total_inventory_value: Money,
    /// Σ sale totals.
    pub total_sales: Money,
    pub products_in_stock: usize,
    pub average_product_value: Money,
    /// Σ volume points over all committed sales.
    pub total_volume_points_sold: f64,
}

pub fn dashboard_stats(store: &Store) -> DashboardStats {
    let products = store.products();

    let low_stock: Vec<&Product> = products.iter().filter(|p| stock::needs_reorder(p)).collect();
    let total_inventory_value: Money = products.iter().map(Product::inventory_value).sum();
    let average_product_value = if products.is_empty() {
        Money::zero()
    } else {
        Money::from_cents(total_inventory_value.cents() / products.len() as i64)
    };

    DashboardStats {
        total_products: products.len(),
        total_customers: store.customers().len(),
        low_stock_count: low_stock.len(),
        low_stock_products: low_stock
            .into_iter()
            .take(DASHBOARD_LOW_STOCK_LIMIT)
            .cloned()
            .collect(),
        total_inventory_value,
        total_sales: store.sales().iter().map(|s| s.total).sum(),
        products_in_stock: products.iter().filter(|p| p.stock > 0).count(),
        average_product_value,
        total_volume_points_sold: store.sales().iter().map(|s| s.volume_points).sum(),
    }
}

// =============================================================================
// Daily Sales
// =============================================================================

/// One sale as listed on the daily report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DailySaleRow {
    pub sale_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub customer_name: String,
    /// `"Formula 1 Vanilla x3, Tea Concentrate x1"`.
    pub products: String,
    pub total: Money,
    pub volume_points: f64,
    /// The customer's current discount; 0 once the customer is deleted.
    pub discount_percent: f64,
}

impl DailySaleRow {
    fn new(sale: &Sale, store: &Store) -> Self {
        let products = sale
            .items
            .iter()
            .map(|item| format!("{} x{}", item.product_name, item.quantity))
            .collect::<Vec<_>>()
            .join(", ");

        DailySaleRow {
            sale_id: sale.id.clone(),
            created_at: sale.created_at,
            customer_name: sale.customer_name.clone(),
            products,
            total: sale.total,
            volume_points: sale.volume_points,
            discount_percent: store
                .customer(&sale.customer_id)
                .map_or(0.0, |c| c.discount_percent),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub rows: Vec<DailySaleRow>,
    pub count: usize,
    pub revenue: Money,
    pub volume_points: f64,
}

/// Sales created on `date` (UTC).
pub fn daily_sales(store: &Store, date: NaiveDate) -> DailySales {
    let rows: Vec<DailySaleRow> = store
        .sales()
        .iter()
        .filter(|s| s.created_at.date_naive() == date)
        .map(|s| DailySaleRow::new(s, store))
        .collect();

    DailySales {
        date,
        count: rows.len(),
        revenue: rows.iter().map(|r| r.total).sum(),
        volume_points: rows.iter().map(|r| r.volume_points).sum(),
        rows,
    }
}

// =============================================================================
// Stock Report
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockFilter {
    #[default]
    All,
    /// stock <= min_stock, out-of-stock included.
    Low,
    /// stock == 0.
    Out,
}

impl StockFilter {
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            StockFilter::All => true,
            StockFilter::Low => product.stock <= product.min_stock,
            StockFilter::Out => product.stock == 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockRow {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub stock: i64,
    pub min_stock: i64,
    pub status: StockStatus,
    /// Display text for `status` ("Low Stock").
    pub status_label: String,
    pub inventory_value: Money,
    pub volume_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockReport {
    pub filter: StockFilter,
    pub rows: Vec<StockRow>,
    pub total_value: Money,
    pub total_volume_points: f64,
}

pub fn stock_report(store: &Store, filter: StockFilter) -> StockReport {
    let rows: Vec<StockRow> = store
        .products()
        .iter()
        .filter(|p| filter.matches(p))
        .map(|p| {
            let status = stock::classify(p);
            StockRow {
                product_id: p.id.clone(),
                name: p.name.clone(),
                category: p.category.clone(),
                stock: p.stock,
                min_stock: p.min_stock,
                status,
                status_label: status.label().to_string(),
                inventory_value: p.inventory_value(),
                volume_points: p.stock_volume_points(),
            }
        })
        .collect();

    StockReport {
        filter,
        total_value: rows.iter().map(|r| r.inventory_value).sum(),
        total_volume_points: rows.iter().map(|r| r.volume_points).sum(),
        rows,
    }
}

// =============================================================================
// Search
// =============================================================================

/// Case-insensitive substring match on name or category.
///
/// `query` is expected lower-cased already (see
/// [`validate_search_query`](crate::validation::validate_search_query)).
/// An empty query matches every product.
pub fn search_products<'a>(store: &'a Store, query: &str) -> Vec<&'a Product> {
    store
        .products()
        .iter()
        .filter(|p| {
            query.is_empty()
                || p.name.to_lowercase().contains(query)
                || p.category.to_lowercase().contains(query)
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SaleBuilder;
    use crate::pricing::TierDefaults;
    use crate::test_support::{customer_named, product_with};
    use chrono::{TimeZone, Utc};

    fn sample_store() -> Store {
        let mut store = Store::default();
        store.seed_sample_data(Utc::now());
        store
    }

    #[test]
    fn test_dashboard_on_sample_data() {
        let store = sample_store();
        let stats = dashboard_stats(&store);

        assert_eq!(stats.total_products, 5);
        assert_eq!(stats.total_customers, 3);
        // Multivitamin (2 <= 5)
        assert_eq!(stats.low_stock_count, 1);
        assert_eq!(stats.low_stock_products[0].name, "Multivitamin");
        assert_eq!(stats.products_in_stock, 5);
        assert_eq!(
            stats.total_inventory_value.cents(),
            4595 * 25 + 4595 * 18 + 3295 * 12 + 2895 * 8 + 3595 * 2
        );
        assert_eq!(stats.total_sales, Money::zero());
    }

    #[test]
    fn test_dashboard_is_idempotent() {
        let store = sample_store();
        assert_eq!(dashboard_stats(&store), dashboard_stats(&store));
    }

    #[test]
    fn test_dashboard_lists_at_most_five_low_stock() {
        let products = (0..7)
            .map(|i| {
                let mut p = product_with(1000, i % 2, 5, 0.0);
                p.id = format!("p{i}");
                p
            })
            .collect();
        let store = Store::from_parts(
            TierDefaults::default(),
            products,
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );

        let stats = dashboard_stats(&store);
        assert_eq!(stats.low_stock_count, 7);
        assert_eq!(stats.low_stock_products.len(), DASHBOARD_LOW_STOCK_LIMIT);
        assert_eq!(stats.products_in_stock, 3);
    }

    #[test]
    fn test_dashboard_saturates_on_oversized_legacy_stock() {
        // Legacy documents bypass form bounds.
        let huge = product_with(100, i64::MAX, 5, 0.0);
        let small = product_with(100, 3, 5, 0.0);
        let store = Store::from_parts(
            TierDefaults::default(),
            vec![huge, small],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );

        let stats = dashboard_stats(&store);
        assert_eq!(stats.total_inventory_value.cents(), i64::MAX);
        assert!(stats.average_product_value.is_positive());

        let report = stock_report(&store, StockFilter::All);
        assert_eq!(report.total_value.cents(), i64::MAX);
    }

    #[test]
    fn test_empty_store_averages_to_zero() {
        let stats = dashboard_stats(&Store::default());
        assert_eq!(stats.average_product_value, Money::zero());
    }

    #[test]
    fn test_daily_sales_filters_by_date() {
        let product = product_with(5000, 10, 5, 2.0);
        let product_id = product.id.clone();
        let mut customer = customer_named("Emily Davis");
        customer.discount_percent = 12.5;
        let customer_id = customer.id.clone();
        let mut store = Store::from_parts(
            TierDefaults::default(),
            vec![product],
            vec![customer],
            Vec::new(),
            Vec::new(),
        );

        let day_one = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let day_two = Utc.with_ymd_and_hms(2024, 3, 2, 9, 30, 0).unwrap();

        for when in [day_one, day_one, day_two] {
            let mut builder = SaleBuilder::new();
            builder.set_product(0, &product_id, store.products());
            builder.select_customer(&customer_id, store.customers());
            builder.commit(&mut store, when).unwrap();
        }

        let report = daily_sales(&store, day_one.date_naive());
        assert_eq!(report.count, 2);
        assert_eq!(report.revenue.cents(), 10_000);
        assert_eq!(report.volume_points, 4.0);
        assert_eq!(report.rows[0].customer_name, "Emily Davis");
        assert_eq!(report.rows[0].products, "Formula 1 Vanilla x1");
        assert_eq!(report.rows[0].discount_percent, 12.5);

        store.delete_customer(&customer_id);
        let after_delete = daily_sales(&store, day_one.date_naive());
        assert_eq!(after_delete.rows[0].discount_percent, 0.0);
        assert_eq!(after_delete.rows[0].customer_name, "Emily Davis");

        let empty = daily_sales(&store, NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
        assert_eq!(empty.count, 0);
        assert_eq!(empty.revenue, Money::zero());
    }

    #[test]
    fn test_stock_report_filters() {
        let mut out = product_with(1000, 0, 2, 1.0);
        out.id = "out".to_string();
        let mut low = product_with(1000, 2, 2, 1.0);
        low.id = "low".to_string();
        let mut ok = product_with(1000, 8, 2, 1.5);
        ok.id = "ok".to_string();
        let store = Store::from_parts(
            TierDefaults::default(),
            vec![out, low, ok],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );

        let all = stock_report(&store, StockFilter::All);
        assert_eq!(all.rows.len(), 3);
        assert_eq!(all.total_value.cents(), 10_000);
        assert_eq!(all.total_volume_points, 14.0);

        let low_report = stock_report(&store, StockFilter::Low);
        let ids: Vec<_> = low_report.rows.iter().map(|r| r.product_id.as_str()).collect();
        assert_eq!(ids, ["out", "low"]);
        assert_eq!(low_report.rows[0].status, StockStatus::OutOfStock);
        assert_eq!(low_report.rows[1].status, StockStatus::LowStock);
        assert_eq!(low_report.rows[0].status_label, "Out of Stock");
        assert_eq!(low_report.rows[1].status_label, "Low Stock");

        let out_report = stock_report(&store, StockFilter::Out);
        assert_eq!(out_report.rows.len(), 1);
        assert_eq!(out_report.total_value, Money::zero());
    }

    #[test]
    fn test_search_matches_name_or_category() {
        let store = sample_store();
        assert_eq!(search_products(&store, "formula").len(), 2);
        assert_eq!(search_products(&store, "digestive").len(), 1);
        assert_eq!(search_products(&store, "").len(), 5);
        assert!(search_products(&store, "protein bar").is_empty());
    }
}
