use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{AccountId, Cents};

pub type TransactionId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in (allowance, scholarship, payments received)
    Income,
    /// Money going out (food, transport, books, ...)
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// Categories offered by default when recording a transaction of this kind.
    /// The store accepts any category string; these are only suggestions.
    pub fn default_categories(&self) -> &'static [&'static str] {
        match self {
            TransactionKind::Income => &["Džeparac", "Stipendija", "Uplata"],
            TransactionKind::Expense => &["Hrana", "Prevoz", "Knjige", "Zabava", "Ostalo"],
        }
    }

    /// Sign applied to an amount of this kind when computing a balance.
    pub fn sign(&self) -> Cents {
        match self {
            TransactionKind::Income => 1,
            TransactionKind::Expense => -1,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(ParseKindError(s.to_string())),
        }
    }
}

/// Restriction on transaction kind when querying history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindFilter {
    #[default]
    All,
    Only(TransactionKind),
}

impl KindFilter {
    pub fn kind(&self) -> Option<TransactionKind> {
        match self {
            KindFilter::All => None,
            KindFilter::Only(kind) => Some(*kind),
        }
    }
}

impl From<TransactionKind> for KindFilter {
    fn from(kind: TransactionKind) -> Self {
        KindFilter::Only(kind)
    }
}

impl FromStr for KindFilter {
    type Err = ParseKindError;

    /// "all" (any case) means no restriction; otherwise a kind name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(KindFilter::All);
        }
        s.parse().map(KindFilter::Only)
    }
}

impl fmt::Display for KindFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KindFilter::All => f.write_str("all"),
            KindFilter::Only(kind) => kind.fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKindError(pub String);

impl fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown transaction kind '{}' (expected income or expense)", self.0)
    }
}

impl std::error::Error for ParseKindError {}

/// A single income or expense record owned by one account.
/// Transactions are never updated in place; they can only be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub account_id: AccountId,
    pub kind: TransactionKind,
    pub category: String,
    /// Amount in cents. Positive for well-formed input; the store does not check.
    pub amount_cents: Cents,
    pub description: String,
    /// Calendar date the transaction belongs to
    pub recorded_date: NaiveDate,
}

impl Transaction {
    /// Amount with the kind's sign applied (income positive, expense negative).
    pub fn signed_amount(&self) -> Cents {
        self.amount_cents.saturating_mul(self.kind.sign())
    }
}

/// A transaction about to be recorded. Id and, if absent, the date are
/// assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub category: String,
    pub amount_cents: Cents,
    pub description: String,
    pub recorded_date: Option<NaiveDate>,
}

impl NewTransaction {
    pub fn new(kind: TransactionKind, category: impl Into<String>, amount_cents: Cents) -> Self {
        Self {
            kind,
            category: category.into(),
            amount_cents,
            description: String::new(),
            recorded_date: None,
        }
    }

    pub fn income(category: impl Into<String>, amount_cents: Cents) -> Self {
        Self::new(TransactionKind::Income, category, amount_cents)
    }

    pub fn expense(category: impl Into<String>, amount_cents: Cents) -> Self {
        Self::new(TransactionKind::Expense, category, amount_cents)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.recorded_date = Some(date);
        self
    }
}
