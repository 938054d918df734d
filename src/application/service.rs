use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use chrono::NaiveDate;
use sqlx::sqlite::SqliteConnectOptions;
use tracing::{debug, info, warn};

use crate::domain::{
    summarize, category_totals, Account, AccountId, KindFilter, NewTransaction, Summary,
    Transaction, TransactionId,
};
use crate::storage::Repository;

use super::{AppError, LedgerReport};

/// Filter for querying transaction history.
///
/// A date restriction applies only when both `from_date` and `to_date` are
/// set. A single bound on its own is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub kind: KindFilter,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kind(mut self, kind: impl Into<KindFilter>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_from_date(mut self, date: NaiveDate) -> Self {
        self.from_date = Some(date);
        self
    }

    pub fn with_to_date(mut self, date: NaiveDate) -> Self {
        self.to_date = Some(date);
        self
    }

    pub fn between(self, from: NaiveDate, to: NaiveDate) -> Self {
        self.with_from_date(from).with_to_date(to)
    }

    /// The inclusive date range to apply, if both bounds are present.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.from_date, self.to_date) {
            (Some(from), Some(to)) => Some((from, to)),
            _ => None,
        }
    }
}

/// The ledger store: registration, log-in, and transaction history for
/// accounts. This is the primary interface for any client.
pub struct LedgerService {
    repo: Repository,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Open the database at the given path. A missing file is created and
    /// the schema migration runs on every open, so a fresh location is usable
    /// without a separate setup step.
    pub async fn init(database_path: impl AsRef<Path>) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::new()
            .filename(database_path.as_ref())
            .create_if_missing(true);
        Self::open(options).await
    }

    /// A private in-memory database, gone once the service is dropped.
    pub async fn in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("Invalid in-memory database URL")?;
        Self::open(options).await
    }

    async fn open(options: SqliteConnectOptions) -> Result<Self, AppError> {
        let repo = Repository::init(options).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Account operations
    // ========================

    /// Register a new account.
    /// Fails with [`AppError::DuplicateLogin`] if the login is already taken.
    pub async fn register(&self, login: &str, credential: &str) -> Result<AccountId, AppError> {
        match self.repo.create_account(login, credential).await? {
            Some(id) => {
                info!(account_id = id, login, "registered account");
                Ok(id)
            }
            None => {
                warn!(login, "registration rejected, login already taken");
                Err(AppError::DuplicateLogin(login.to_string()))
            }
        }
    }

    /// Look up the account whose login and credential both match exactly.
    pub async fn authenticate(
        &self,
        login: &str,
        credential: &str,
    ) -> Result<Option<AccountId>, AppError> {
        Ok(self.repo.find_account_id(login, credential).await?)
    }

    /// Like [`authenticate`](Self::authenticate), but a mismatch is an error.
    pub async fn log_in(&self, login: &str, credential: &str) -> Result<Account, AppError> {
        let Some(id) = self.authenticate(login, credential).await? else {
            warn!(login, "log-in failed");
            return Err(AppError::InvalidCredential);
        };

        self.repo
            .get_account(id)
            .await?
            .ok_or(AppError::InvalidCredential)
    }

    pub async fn get_account(&self, id: AccountId) -> Result<Option<Account>, AppError> {
        Ok(self.repo.get_account(id).await?)
    }

    pub async fn count_accounts(&self) -> Result<i64, AppError> {
        Ok(self.repo.count_accounts().await?)
    }

    // ========================
    // Transaction operations
    // ========================

    /// Record a transaction for an account.
    ///
    /// Neither the account id nor the amount is checked here; callers
    /// validate amounts with [`parse_amount`](super::parse_amount).
    pub async fn record_transaction(
        &self,
        account_id: AccountId,
        transaction: NewTransaction,
    ) -> Result<TransactionId, AppError> {
        let id = self.repo.save_transaction(account_id, &transaction).await?;
        info!(
            transaction_id = id,
            account_id,
            kind = %transaction.kind,
            amount_cents = transaction.amount_cents,
            "recorded transaction"
        );
        Ok(id)
    }

    pub async fn get_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, AppError> {
        Ok(self.repo.get_transaction(id).await?)
    }

    /// Query an account's transactions, newest date first.
    pub async fn query_transactions(
        &self,
        account_id: AccountId,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, AppError> {
        let date_range = filter.date_range();
        if date_range.is_none() && (filter.from_date.is_some() || filter.to_date.is_some()) {
            debug!(
                from = ?filter.from_date,
                to = ?filter.to_date,
                "single date bound given, date filter not applied"
            );
        }

        let transactions = self
            .repo
            .list_transactions(account_id, filter.kind.kind(), date_range)
            .await?;
        debug!(
            account_id,
            kind = %filter.kind,
            rows = transactions.len(),
            "queried transactions"
        );
        Ok(transactions)
    }

    /// All of an account's transactions, newest date first.
    pub async fn list_transactions(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, AppError> {
        self.query_transactions(account_id, &TransactionFilter::default())
            .await
    }

    /// Delete a transaction. Deleting an unknown id is a no-op.
    /// Returns whether anything was removed.
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<bool, AppError> {
        let removed = self.repo.delete_transaction(id).await?;
        if removed {
            info!(transaction_id = id, "deleted transaction");
        } else {
            debug!(transaction_id = id, "delete of unknown transaction ignored");
        }
        Ok(removed)
    }

    // ========================
    // Reporting
    // ========================

    /// Income, expense and balance over the filtered set.
    pub async fn summary(
        &self,
        account_id: AccountId,
        filter: &TransactionFilter,
    ) -> Result<Summary, AppError> {
        let transactions = self.query_transactions(account_id, filter).await?;
        Ok(summarize(&transactions))
    }

    /// Per-category totals plus the summary over the filtered set.
    pub async fn report(
        &self,
        account_id: AccountId,
        filter: &TransactionFilter,
    ) -> Result<LedgerReport, AppError> {
        let transactions = self.query_transactions(account_id, filter).await?;
        Ok(LedgerReport {
            kind: filter.kind.to_string(),
            date_range: filter.date_range(),
            summary: summarize(&transactions),
            categories: category_totals(&transactions),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_filter_date_range_requires_both_bounds() {
        assert_eq!(TransactionFilter::new().date_range(), None);
        assert_eq!(
            TransactionFilter::new()
                .with_from_date(date("2024-01-01"))
                .date_range(),
            None
        );
        assert_eq!(
            TransactionFilter::new()
                .with_to_date(date("2024-01-31"))
                .date_range(),
            None
        );
        assert_eq!(
            TransactionFilter::new()
                .between(date("2024-01-01"), date("2024-01-31"))
                .date_range(),
            Some((date("2024-01-01"), date("2024-01-31")))
        );
    }
}
