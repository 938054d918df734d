use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::domain::{
    Account, AccountId, NewTransaction, Transaction, TransactionId, TransactionKind,
};

use super::MIGRATION_001_INITIAL;

/// Date format used for the recorded_date column.
const DATE_FORMAT: &str = "%Y-%m-%d";

const TRANSACTION_COLUMNS: &str =
    "id, account_id, kind, category, amount_cents, description, recorded_date";

/// Repository for persisting and querying accounts and transactions.
///
/// The pool holds exactly one connection, so every statement is serialized
/// through it regardless of how many tasks share the repository.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a single-connection pool with the given options.
    ///
    /// Foreign keys are left unenforced: transactions may reference an
    /// account id that does not exist.
    pub async fn connect(options: SqliteConnectOptions) -> Result<Self> {
        let options = options.foreign_keys(false);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            // An in-memory database lives only as long as its connection
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations. Safe to run on every start.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(options: SqliteConnectOptions) -> Result<Self> {
        let repo = Self::connect(options).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Account operations
    // ========================

    /// Insert a new account.
    /// Returns `None` if the login is already taken; any other failure is an error.
    pub async fn create_account(&self, login: &str, credential: &str) -> Result<Option<AccountId>> {
        let result = sqlx::query("INSERT INTO accounts (login, credential) VALUES (?, ?)")
            .bind(login)
            .bind(credential)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(Some(done.last_insert_rowid())),
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => Ok(None),
            Err(err) => Err(anyhow::Error::new(err).context("Failed to save account")),
        }
    }

    /// Find the account whose login and credential both match exactly.
    pub async fn find_account_id(
        &self,
        login: &str,
        credential: &str,
    ) -> Result<Option<AccountId>> {
        let row = sqlx::query("SELECT id FROM accounts WHERE login = ? AND credential = ?")
            .bind(login)
            .bind(credential)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to look up account")?;

        Ok(row.map(|row| row.get("id")))
    }

    /// Get an account by ID.
    pub async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query("SELECT id, login, credential FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch account")?;

        Ok(row.as_ref().map(Self::row_to_account))
    }

    pub async fn count_accounts(&self) -> Result<i64> {
        let count = sqlx::query("SELECT COUNT(*) as count FROM accounts")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count accounts")?
            .get("count");
        Ok(count)
    }

    fn row_to_account(row: &SqliteRow) -> Account {
        Account {
            id: row.get("id"),
            login: row.get("login"),
            credential: row.get("credential"),
        }
    }

    // ========================
    // Transaction operations
    // ========================

    /// Save a new transaction and return its assigned ID.
    /// Without an explicit date the column default (the current UTC date) is used.
    pub async fn save_transaction(
        &self,
        account_id: AccountId,
        transaction: &NewTransaction,
    ) -> Result<TransactionId> {
        let query = match transaction.recorded_date {
            Some(date) => sqlx::query(
                r#"
                INSERT INTO transactions (account_id, kind, category, amount_cents, description, recorded_date)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(account_id)
            .bind(transaction.kind.as_str())
            .bind(&transaction.category)
            .bind(transaction.amount_cents)
            .bind(&transaction.description)
            .bind(date.format(DATE_FORMAT).to_string()),
            None => sqlx::query(
                r#"
                INSERT INTO transactions (account_id, kind, category, amount_cents, description)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(account_id)
            .bind(transaction.kind.as_str())
            .bind(&transaction.category)
            .bind(transaction.amount_cents)
            .bind(&transaction.description),
        };

        let done = query
            .execute(&self.pool)
            .await
            .context("Failed to save transaction")?;

        Ok(done.last_insert_rowid())
    }

    /// Get a transaction by ID.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let row = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch transaction")?;

        row.as_ref().map(Self::row_to_transaction).transpose()
    }

    /// List an account's transactions, newest date first.
    ///
    /// `kind` restricts to one kind when set. `date_range` restricts to the
    /// inclusive range of calendar dates when set.
    pub async fn list_transactions(
        &self,
        account_id: AccountId,
        kind: Option<TransactionKind>,
        date_range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<Transaction>> {
        let mut query =
            format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE account_id = ?");

        if kind.is_some() {
            query.push_str(" AND kind = ?");
        }
        if date_range.is_some() {
            // ISO dates compare correctly as text
            query.push_str(" AND recorded_date BETWEEN ? AND ?");
        }

        query.push_str(" ORDER BY recorded_date DESC, id DESC");

        let mut sql_query = sqlx::query(&query).bind(account_id);

        if let Some(kind) = kind {
            sql_query = sql_query.bind(kind.as_str());
        }
        if let Some((from, to)) = date_range {
            sql_query = sql_query
                .bind(from.format(DATE_FORMAT).to_string())
                .bind(to.format(DATE_FORMAT).to_string());
        }

        let rows = sql_query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// Delete a transaction. Returns whether a row was removed.
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<bool> {
        let done = sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete transaction")?;
        Ok(done.rows_affected() > 0)
    }

    fn row_to_transaction(row: &SqliteRow) -> Result<Transaction> {
        let kind_str: String = row.get("kind");
        let date_str: String = row.get("recorded_date");

        Ok(Transaction {
            id: row.get("id"),
            account_id: row.get("account_id"),
            kind: kind_str
                .parse()
                .with_context(|| format!("Invalid transaction kind: {kind_str}"))?,
            category: row.get("category"),
            amount_cents: row.get("amount_cents"),
            description: row.get("description"),
            recorded_date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                .with_context(|| format!("Invalid recorded_date: {date_str}"))?,
        })
    }
}
