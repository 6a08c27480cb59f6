use crate::{errors::ServiceError, repositories::sales};
use chrono::{DateTime, Duration, Utc};
use sea_orm::ConnectionTrait;
use std::collections::BTreeMap;
use tracing::debug;

/// Trailing window over which sales are summed, in whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalesWindow {
    days: u32,
}

impl SalesWindow {
    /// Returns `None` for a zero-length window
    pub fn days(days: u32) -> Option<Self> {
        (days > 0).then_some(Self { days })
    }

    pub fn length_days(&self) -> u32 {
        self.days
    }

    /// Earliest order timestamp that still counts. Orders created exactly at
    /// the cutoff are inside the window.
    pub fn cutoff(&self, as_of: DateTime<Utc>) -> DateTime<Utc> {
        as_of - Duration::days(i64::from(self.days))
    }
}

/// Units sold per product inside one window.
///
/// Only products with at least one qualifying sale are present; absence means
/// no recent sales.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesActivity {
    totals: BTreeMap<i32, i64>,
}

impl SalesActivity {
    pub fn total_for(&self, product_id: i32) -> Option<i64> {
        self.totals.get(&product_id).copied()
    }

    /// Candidate product ids in ascending order
    pub fn product_ids(&self) -> Vec<i32> {
        self.totals.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }
}

impl FromIterator<(i32, i64)> for SalesActivity {
    fn from_iter<I: IntoIterator<Item = (i32, i64)>>(iter: I) -> Self {
        let mut totals = BTreeMap::new();
        for (product_id, sold) in iter {
            if sold > 0 {
                *totals.entry(product_id).or_insert(0) += sold;
            }
        }
        Self { totals }
    }
}

/// Sums units sold per product for `company_id` over the window ending at
/// `as_of`.
pub async fn recent_sales<C>(
    conn: &C,
    company_id: i32,
    window: SalesWindow,
    as_of: DateTime<Utc>,
) -> Result<SalesActivity, ServiceError>
where
    C: ConnectionTrait,
{
    let cutoff = window.cutoff(as_of);
    let rows = sales::units_sold_since(conn, company_id, cutoff)
        .await
        .map_err(ServiceError::db_error)?;

    let activity: SalesActivity = rows
        .into_iter()
        .map(|row| (row.product_id, row.total_sold))
        .collect();

    debug!(
        company_id,
        window_days = window.length_days(),
        %cutoff,
        candidates = activity.len(),
        "Computed recent sales activity"
    );

    Ok(activity)
}
