//! Validation of raw user input at the presentation boundary.
//!
//! The store itself accepts whatever it is given; front ends run input
//! through these helpers first so that a bad amount never reaches it.

use chrono::NaiveDate;

use crate::domain::{format_cents, parse_cents, Cents, KindFilter, TransactionKind};

use super::AppError;

/// Largest amount accepted from user input: one billion units.
pub const MAX_AMOUNT_CENTS: Cents = 1_000_000_000 * 100;

/// Parse an amount that must be a positive decimal number no larger than
/// [`MAX_AMOUNT_CENTS`].
pub fn parse_amount(input: &str) -> Result<Cents, AppError> {
    let cents =
        parse_cents(input).map_err(|e| AppError::InvalidAmount(format!("'{input}': {e}")))?;
    if cents <= 0 {
        return Err(AppError::InvalidAmount(format!(
            "'{input}': amount must be greater than 0"
        )));
    }
    if cents > MAX_AMOUNT_CENTS {
        return Err(AppError::InvalidAmount(format!(
            "'{input}': amount must not exceed {}",
            format_cents(MAX_AMOUNT_CENTS)
        )));
    }
    Ok(cents)
}

pub fn parse_kind(input: &str) -> Result<TransactionKind, AppError> {
    input
        .parse()
        .map_err(|_| AppError::InvalidKind(input.to_string()))
}

/// Parse a kind filter; "all" means no restriction.
pub fn parse_kind_filter(input: &str) -> Result<KindFilter, AppError> {
    input
        .parse()
        .map_err(|_| AppError::InvalidKind(input.to_string()))
}

/// Parse a calendar date in YYYY-MM-DD format.
pub fn parse_date(input: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::InvalidDate(format!("'{input}' (expected YYYY-MM-DD)")))
}
