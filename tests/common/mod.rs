// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use finplan::application::LedgerService;
use finplan::domain::{AccountId, NewTransaction, TransactionId};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(&db_path).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string into a NaiveDate
pub fn date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Register an account and return its id
pub async fn register(service: &LedgerService, login: &str) -> Result<AccountId> {
    Ok(service.register(login, "secret").await?)
}

/// Test fixture: a month of activity for one account
pub struct JanuaryHistory;

impl JanuaryHistory {
    /// Records, in this order:
    /// 2023-12-28 income 50.00, 2024-01-05 income 100.00, 2024-01-10 expense 15.00,
    /// 2024-01-31 expense 25.00, 2024-02-01 expense 5.00
    pub async fn record(
        service: &LedgerService,
        account_id: AccountId,
    ) -> Result<Vec<TransactionId>> {
        let entries = [
            NewTransaction::income("Džeparac", 5000).with_date(date("2023-12-28")),
            NewTransaction::income("Stipendija", 10000).with_date(date("2024-01-05")),
            NewTransaction::expense("Hrana", 1500).with_date(date("2024-01-10")),
            NewTransaction::expense("Prevoz", 2500)
                .with_description("monthly pass")
                .with_date(date("2024-01-31")),
            NewTransaction::expense("Knjige", 500).with_date(date("2024-02-01")),
        ];

        let mut ids = Vec::new();
        for entry in entries {
            ids.push(service.record_transaction(account_id, entry).await?);
        }
        Ok(ids)
    }
}
