//! # Report Commands
//!
//! Read-only projections, recomputed from the store on every call.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tally_core::report::{self, DailySales, DashboardStats, StockFilter, StockReport};
use tracing::debug;

use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DailySalesArgs {
    /// `YYYY-MM-DD`; today (UTC) when absent.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StockReportArgs {
    pub filter: StockFilter,
}

pub fn dashboard(app: &AppState) -> DashboardStats {
    debug!("dashboard command");
    report::dashboard_stats(&app.store)
}

pub fn daily_sales(app: &AppState, args: DailySalesArgs) -> DailySales {
    let date = args.date.unwrap_or_else(|| Utc::now().date_naive());
    debug!(%date, "daily_sales command");
    report::daily_sales(&app.store, date)
}

pub fn stock_report(app: &AppState, args: StockReportArgs) -> StockReport {
    debug!(filter = ?args.filter, "stock_report command");
    report::stock_report(&app.store, args.filter)
}

#[cfg(test)]
mod tests {
    use crate::commands::dispatch;
    use crate::error::ErrorCode;
    use crate::test_support::{complete_sale_of, seeded_state};
    use serde_json::json;

    #[tokio::test]
    async fn test_dashboard_reflects_completed_sale() {
        let (mut app, _kv) = seeded_state().await;

        let before = dispatch(&mut app, "dashboard", json!({})).await.unwrap();
        assert_eq!(before["totalProducts"], 5);
        assert_eq!(before["totalSales"], 0);
        // Multivitamin: 2 on hand, reorder at 5
        assert_eq!(before["lowStockCount"], 1);

        let sale = complete_sale_of(&mut app, "Tea Concentrate", 2).await;

        let after = dispatch(&mut app, "dashboard", json!({})).await.unwrap();
        assert_eq!(after["totalSales"], sale.total.cents());

        let today = dispatch(&mut app, "daily_sales", json!({})).await.unwrap();
        assert_eq!(today["count"], 1);
        assert_eq!(today["revenue"], sale.total.cents());

        let other_day = dispatch(&mut app, "daily_sales", json!({"date": "2001-01-01"}))
            .await
            .unwrap();
        assert_eq!(other_day["count"], 0);
    }

    #[tokio::test]
    async fn test_stock_report_filters() {
        let (mut app, _kv) = seeded_state().await;

        let all = dispatch(&mut app, "stock_report", json!({})).await.unwrap();
        assert_eq!(all["rows"].as_array().unwrap().len(), 5);

        let low = dispatch(&mut app, "stock_report", json!({"filter": "low"}))
            .await
            .unwrap();
        assert_eq!(low["rows"].as_array().unwrap().len(), 1);

        let out = dispatch(&mut app, "stock_report", json!({"filter": "out"}))
            .await
            .unwrap();
        assert!(out["rows"].as_array().unwrap().is_empty());

        let err = dispatch(&mut app, "stock_report", json!({"filter": "sideways"}))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BadRequest);
    }
}
