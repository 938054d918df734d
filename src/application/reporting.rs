use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{CategoryTotal, Summary};

/// Totals over one filtered view of an account's history.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerReport {
    /// Kind filter that produced the view ("all", "income" or "expense")
    pub kind: String,
    /// Inclusive date range, when one was applied
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub summary: Summary,
    pub categories: Vec<CategoryTotal>,
}
