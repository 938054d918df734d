use std::collections::BTreeMap;

use serde::Serialize;

use super::{Cents, Transaction, TransactionKind};

/// Totals over a retrieved set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub income: Cents,
    pub expense: Cents,
    /// income - expense
    pub balance: Cents,
    pub count: usize,
}

/// Compute the balance over a list of transactions.
/// Balance = sum of income amounts - sum of expense amounts
///
/// Totals saturate at the bounds of [`Cents`] rather than overflowing.
pub fn compute_balance(transactions: &[Transaction]) -> Cents {
    transactions
        .iter()
        .map(Transaction::signed_amount)
        .fold(0, Cents::saturating_add)
}

/// Compute income, expense and balance totals in a single pass.
/// Saturates like [`compute_balance`].
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let mut summary = transactions
        .iter()
        .fold(Summary::default(), |mut acc, tx| {
            match tx.kind {
                TransactionKind::Income => {
                    acc.income = acc.income.saturating_add(tx.amount_cents)
                }
                TransactionKind::Expense => {
                    acc.expense = acc.expense.saturating_add(tx.amount_cents)
                }
            }
            acc.count += 1;
            acc
        });
    summary.balance = summary.income.saturating_sub(summary.expense);
    summary
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub kind: TransactionKind,
    pub category: String,
    pub total: Cents,
    pub count: usize,
}

/// Group transactions by (kind, category).
/// Income categories come first; within a kind, larger totals come first.
pub fn category_totals(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut groups: BTreeMap<(TransactionKind, &str), (Cents, usize)> = BTreeMap::new();
    for tx in transactions {
        let entry = groups.entry((tx.kind, tx.category.as_str())).or_default();
        entry.0 = entry.0.saturating_add(tx.amount_cents);
        entry.1 += 1;
    }

    let mut totals: Vec<CategoryTotal> = groups
        .into_iter()
        .map(|((kind, category), (total, count))| CategoryTotal {
            kind,
            category: category.to_string(),
            total,
            count,
        })
        .collect();
    totals.sort_by(|a, b| a.kind.cmp(&b.kind).then(b.total.cmp(&a.total)));
    totals
}
