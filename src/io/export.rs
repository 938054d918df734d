use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

use crate::application::{LedgerService, TransactionFilter};
use crate::domain::{format_cents, summarize, Account, Summary, Transaction};

/// Export formats supported by [`Exporter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

/// JSON document for an exported transaction history.
#[derive(Debug, Clone, Serialize)]
pub struct HistorySnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub login: String,
    pub summary: Summary,
    pub transactions: Vec<Transaction>,
}

/// Exporter for writing an account's history to various formats
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export the filtered transactions to CSV, newest first.
    /// Returns the number of rows written.
    pub async fn export_transactions_csv<W: Write>(
        &self,
        account: &Account,
        filter: &TransactionFilter,
        writer: W,
    ) -> Result<usize> {
        let transactions = self.service.query_transactions(account.id, filter).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "date",
            "kind",
            "category",
            "amount",
            "description",
        ])?;

        for tx in &transactions {
            csv_writer.write_record([
                tx.id.to_string(),
                tx.recorded_date.to_string(),
                tx.kind.to_string(),
                tx.category.clone(),
                format_cents(tx.amount_cents),
                tx.description.clone(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(transactions.len())
    }

    /// Export the filtered transactions and their summary as a JSON document.
    pub async fn export_transactions_json<W: Write>(
        &self,
        account: &Account,
        filter: &TransactionFilter,
        mut writer: W,
    ) -> Result<HistorySnapshot> {
        let transactions = self.service.query_transactions(account.id, filter).await?;

        let snapshot = HistorySnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            login: account.login.clone(),
            summary: summarize(&transactions),
            transactions,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
