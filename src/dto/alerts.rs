use crate::services::low_stock::{LowStockFinding, LowStockReport, SupplierRef};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query string of the low-stock endpoint
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LowStockAlertsQuery {
    /// Trailing sales window in days; the configured default applies when absent
    pub window_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SupplierInfo {
    pub id: i32,
    pub name: String,
    pub contact_email: Option<String>,
}

/// One product below threshold in one warehouse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LowStockAlert {
    pub product_id: i32,
    pub product_name: String,
    pub sku: String,
    pub warehouse_id: i32,
    pub warehouse_name: String,
    pub current_stock: i32,
    pub threshold: i32,
    /// Units sold inside the window
    pub recent_sales: i64,
    pub avg_daily_sales: f64,
    /// Whole days until stock runs out at the average rate; null without a rate
    pub days_until_stockout: Option<i64>,
    /// Null when the product has no linked supplier
    pub supplier: Option<SupplierInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LowStockAlertsResponse {
    pub alerts: Vec<LowStockAlert>,
    pub total_alerts: usize,
    pub window_days: u32,
}

impl From<SupplierRef> for SupplierInfo {
    fn from(supplier: SupplierRef) -> Self {
        Self {
            id: supplier.id,
            name: supplier.name,
            contact_email: supplier.contact_email,
        }
    }
}

impl From<LowStockFinding> for LowStockAlert {
    fn from(finding: LowStockFinding) -> Self {
        Self {
            product_id: finding.product_id,
            product_name: finding.product_name,
            sku: finding.sku,
            warehouse_id: finding.warehouse_id,
            warehouse_name: finding.warehouse_name,
            current_stock: finding.current_stock,
            threshold: finding.threshold,
            recent_sales: finding.recent_sales,
            avg_daily_sales: finding.avg_daily_sales,
            days_until_stockout: finding.days_until_stockout,
            supplier: finding.supplier.map(SupplierInfo::from),
        }
    }
}

impl From<LowStockReport> for LowStockAlertsResponse {
    fn from(report: LowStockReport) -> Self {
        let alerts: Vec<LowStockAlert> = report.findings.into_iter().map(LowStockAlert::from).collect();
        Self {
            total_alerts: alerts.len(),
            alerts,
            window_days: report.window_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn finding(supplier: Option<SupplierRef>) -> LowStockFinding {
        LowStockFinding {
            product_id: 1,
            product_name: "Widget".into(),
            sku: "WID-001".into(),
            warehouse_id: 2,
            warehouse_name: "Main".into(),
            current_stock: 4,
            threshold: 10,
            recent_sales: 60,
            avg_daily_sales: 2.0,
            days_until_stockout: Some(2),
            supplier,
        }
    }

    #[test]
    fn missing_supplier_serializes_as_null() {
        let alert = LowStockAlert::from(finding(None));
        let value = serde_json::to_value(&alert).unwrap();
        assert_eq!(value["supplier"], json!(null));
        assert_eq!(value["days_until_stockout"], json!(2));
    }

    #[test]
    fn envelope_counts_alerts_without_filtering() {
        let report = LowStockReport {
            window_days: 30,
            findings: vec![
                finding(None),
                finding(Some(SupplierRef {
                    id: 4,
                    name: "Acme".into(),
                    contact_email: Some("orders@acme.test".into()),
                })),
            ],
        };
        let response = LowStockAlertsResponse::from(report);
        assert_eq!(response.total_alerts, 2);
        assert_eq!(response.window_days, 30);
        assert_eq!(response.alerts[1].supplier.as_ref().map(|s| s.id), Some(4));
    }
}
