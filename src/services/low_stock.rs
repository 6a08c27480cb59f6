use crate::{
    config::AppConfig,
    db::{self, DbPool},
    errors::ServiceError,
    repositories::{alerts, alerts::LowStockRow, catalog},
    services::sales_activity::{self, SalesActivity, SalesWindow},
};
use chrono::{DateTime, Utc};
use metrics::counter;
use sea_orm::ConnectionTrait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Supplier reported alongside an alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierRef {
    pub id: i32,
    pub name: String,
    pub contact_email: Option<String>,
}

/// One (product, warehouse) pair below threshold with recent sales.
#[derive(Debug, Clone, PartialEq)]
pub struct LowStockFinding {
    pub product_id: i32,
    pub product_name: String,
    pub sku: String,
    pub warehouse_id: i32,
    pub warehouse_name: String,
    pub current_stock: i32,
    pub threshold: i32,
    pub recent_sales: i64,
    pub avg_daily_sales: f64,
    pub days_until_stockout: Option<i64>,
    pub supplier: Option<SupplierRef>,
}

/// Detector output for one company and window
#[derive(Debug, Clone, PartialEq)]
pub struct LowStockReport {
    pub window_days: u32,
    pub findings: Vec<LowStockFinding>,
}

/// Average units sold per day over the window
pub fn average_daily_sales(recent_total: i64, window_days: u32) -> f64 {
    if window_days == 0 {
        return 0.0;
    }
    recent_total as f64 / f64::from(window_days)
}

/// Whole days until `quantity` runs out at the window's average sale rate.
///
/// Evaluates `floor(quantity / (recent_total / window_days))` as
/// `quantity * window_days / recent_total` in integers. Without sales the
/// rate is zero and no projection exists.
pub fn days_until_stockout(quantity: i32, recent_total: i64, window_days: u32) -> Option<i64> {
    if recent_total <= 0 || window_days == 0 {
        return None;
    }
    let quantity = i64::from(quantity.max(0));
    Some(quantity * i64::from(window_days) / recent_total)
}

/// Collapses supplier fan-out to one finding per (product, warehouse),
/// keeping the lowest supplier id.
fn collapse_rows(rows: Vec<LowStockRow>) -> BTreeMap<(i32, i32), LowStockRow> {
    let mut by_location: BTreeMap<(i32, i32), LowStockRow> = BTreeMap::new();

    for row in rows {
        let key = (row.product_id, row.warehouse_id);
        match by_location.get_mut(&key) {
            Some(existing) => {
                if let (Some(current), Some(candidate)) = (existing.supplier_id, row.supplier_id) {
                    if candidate < current {
                        *existing = row;
                    }
                } else if existing.supplier_id.is_none() {
                    *existing = row;
                }
            }
            None => {
                by_location.insert(key, row);
            }
        }
    }

    by_location
}

fn into_finding(row: LowStockRow, recent_sales: i64, window: SalesWindow) -> LowStockFinding {
    let window_days = window.length_days();
    let supplier = match (row.supplier_id, row.supplier_name) {
        (Some(id), Some(name)) => Some(SupplierRef {
            id,
            name,
            contact_email: row.supplier_contact_email,
        }),
        _ => None,
    };

    LowStockFinding {
        product_id: row.product_id,
        product_name: row.product_name,
        sku: row.sku,
        warehouse_id: row.warehouse_id,
        warehouse_name: row.warehouse_name,
        current_stock: row.quantity,
        threshold: row.threshold,
        recent_sales,
        avg_daily_sales: average_daily_sales(recent_sales, window_days),
        days_until_stockout: days_until_stockout(row.quantity, recent_sales, window_days),
        supplier,
    }
}

/// Joins the recent-sales candidates against inventory and thresholds.
///
/// Fails with `NotFound` when the company does not exist. A company with no
/// recent sales yields an empty list without running the inventory join.
pub async fn detect<C>(
    conn: &C,
    company_id: i32,
    window: SalesWindow,
    as_of: DateTime<Utc>,
) -> Result<Vec<LowStockFinding>, ServiceError>
where
    C: ConnectionTrait,
{
    if !catalog::company_exists(conn, company_id)
        .await
        .map_err(ServiceError::db_error)?
    {
        return Err(ServiceError::NotFound(format!(
            "company {} not found",
            company_id
        )));
    }

    let activity: SalesActivity =
        sales_activity::recent_sales(conn, company_id, window, as_of).await?;
    if activity.is_empty() {
        debug!(company_id, "No recent sales; skipping inventory join");
        return Ok(Vec::new());
    }

    let rows = alerts::low_stock_rows(conn, company_id, &activity.product_ids())
        .await
        .map_err(ServiceError::db_error)?;

    let findings = collapse_rows(rows)
        .into_values()
        .filter_map(|row| {
            let sold = activity.total_for(row.product_id)?;
            Some(into_finding(row, sold, window))
        })
        .collect();

    Ok(findings)
}

/// Service computing low-stock alerts per company
#[derive(Clone)]
pub struct LowStockService {
    db_pool: Arc<DbPool>,
    default_window_days: u32,
    max_window_days: u32,
}

impl LowStockService {
    pub fn new(db_pool: Arc<DbPool>, config: &AppConfig) -> Self {
        Self {
            db_pool,
            default_window_days: config.alert_window_days,
            max_window_days: config.max_alert_window_days,
        }
    }

    /// Picks the request override or the configured default
    pub fn resolve_window(&self, requested_days: Option<u32>) -> Result<SalesWindow, ServiceError> {
        let days = requested_days.unwrap_or(self.default_window_days);
        if days > self.max_window_days {
            return Err(ServiceError::invalid_field(
                "window_days",
                format!("an integer between 1 and {}", self.max_window_days),
            ));
        }
        SalesWindow::days(days).ok_or_else(|| {
            ServiceError::invalid_field(
                "window_days",
                format!("an integer between 1 and {}", self.max_window_days),
            )
        })
    }

    /// Alerts for `company_id` as of now
    #[instrument(skip(self))]
    pub async fn alerts_for_company(
        &self,
        company_id: i32,
        requested_window_days: Option<u32>,
    ) -> Result<LowStockReport, ServiceError> {
        let window = self.resolve_window(requested_window_days)?;
        self.alerts_as_of(company_id, window, Utc::now()).await
    }

    /// Runs the aggregation and the inventory join against one snapshot.
    pub async fn alerts_as_of(
        &self,
        company_id: i32,
        window: SalesWindow,
        as_of: DateTime<Utc>,
    ) -> Result<LowStockReport, ServiceError> {
        let txn = db::begin_snapshot_read(&self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        let findings = detect(&txn, company_id, window, as_of).await?;
        txn.commit().await.map_err(ServiceError::db_error)?;

        counter!("stockguard.alerts.computed", 1);
        counter!("stockguard.alerts.emitted", findings.len() as u64);
        info!(
            company_id,
            window_days = window.length_days(),
            alerts = findings.len(),
            "Computed low-stock alerts"
        );

        Ok(LowStockReport {
            window_days: window.length_days(),
            findings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn row(product_id: i32, warehouse_id: i32, supplier_id: Option<i32>) -> LowStockRow {
        LowStockRow {
            product_id,
            product_name: format!("Product {product_id}"),
            sku: format!("SKU-{product_id}"),
            warehouse_id,
            warehouse_name: format!("Warehouse {warehouse_id}"),
            quantity: 4,
            threshold: 10,
            supplier_id,
            supplier_name: supplier_id.map(|id| format!("Supplier {id}")),
            supplier_contact_email: None,
        }
    }

    #[test]
    fn worked_example_projects_two_days() {
        // threshold 10, 4 on hand, 60 sold over 30 days
        assert_eq!(average_daily_sales(60, 30), 2.0);
        assert_eq!(days_until_stockout(4, 60, 30), Some(2));
    }

    #[test]
    fn no_sales_means_no_projection() {
        assert_eq!(days_until_stockout(4, 0, 30), None);
        assert_eq!(days_until_stockout(4, 10, 0), None);
    }

    #[test]
    fn projection_floors_fractional_days() {
        // 7 sold in 30 days => 0.2333/day; 5 / 0.2333 = 21.43
        assert_eq!(days_until_stockout(5, 7, 30), Some(21));
        assert_eq!(days_until_stockout(0, 7, 30), Some(0));
    }

    #[test]
    fn supplier_fan_out_keeps_lowest_supplier() {
        let collapsed = collapse_rows(vec![
            row(1, 1, Some(9)),
            row(1, 1, Some(3)),
            row(1, 2, None),
            row(2, 1, Some(5)),
        ]);

        let keys: Vec<_> = collapsed.keys().copied().collect();
        assert_eq!(keys, vec![(1, 1), (1, 2), (2, 1)]);
        assert_eq!(collapsed[&(1, 1)].supplier_id, Some(3));
        assert_eq!(collapsed[&(1, 2)].supplier_id, None);
    }

    #[test]
    fn finding_without_supplier_has_none() {
        let window = SalesWindow::days(30).unwrap();
        let finding = into_finding(row(1, 1, None), 60, window);
        assert!(finding.supplier.is_none());
        assert_eq!(finding.days_until_stockout, Some(2));
    }

    proptest! {
        #[test]
        fn integer_projection_matches_float_floor(
            quantity in 0i32..100_000,
            total in 1i64..1_000_000,
            window in 1u32..=365,
        ) {
            let projected = days_until_stockout(quantity, total, window).unwrap();
            let exact = i128::from(quantity) * i128::from(window);
            prop_assert_eq!(i128::from(projected), exact / i128::from(total));
            prop_assert!(i128::from(projected) * i128::from(total) <= exact);
            prop_assert!((i128::from(projected) + 1) * i128::from(total) > exact);
        }

        #[test]
        fn more_stock_never_shortens_projection(
            quantity in 0i32..50_000,
            extra in 0i32..50_000,
            total in 1i64..100_000,
            window in 1u32..=365,
        ) {
            let base = days_until_stockout(quantity, total, window).unwrap();
            let more = days_until_stockout(quantity + extra, total, window).unwrap();
            prop_assert!(more >= base);
        }
    }
}
