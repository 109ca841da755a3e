//! Cash movements and the account/category pivot.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::iiko::OlapRow;

/// Account name for operational activity.
pub const ACCOUNT_OPERATIONAL: &str = "Операционная деятельность";

/// Account name for financial activity.
pub const ACCOUNT_FINANCIAL: &str = "Финансовая деятельность";

/// Maps English account names to the report's Russian ones.
#[must_use]
pub fn normalize_account(account_name: &str) -> String {
    match account_name {
        "Operational activity" => ACCOUNT_OPERATIONAL.to_owned(),
        "Financial activity" => ACCOUNT_FINANCIAL.to_owned(),
        other => other.to_owned(),
    }
}

/// Maps English category names to Russian ones; missing becomes empty.
#[must_use]
pub fn normalize_category(category_name: Option<&str>) -> String {
    match category_name {
        None | Some("") => String::new(),
        Some("Loan" | "Loans") => "Займ".to_owned(),
        Some("Salary") => "Зарплата".to_owned(),
        Some("Rent") => "Аренда".to_owned(),
        Some(other) => other.to_owned(),
    }
}

/// A single signed cash movement.
#[derive(Debug, Clone, PartialEq)]
pub struct Movement {
    pub date: Option<NaiveDate>,
    pub account: String,
    pub category: String,
    /// Negative for expenses, positive for income.
    pub amount: f64,
}

impl Movement {
    /// Creates a movement from already normalized values.
    #[must_use]
    pub fn new(
        date: Option<NaiveDate>,
        account: impl Into<String>,
        category: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            date,
            account: account.into(),
            category: category.into(),
            amount,
        }
    }

    /// Normalizes names and applies the expense sign.
    #[must_use]
    pub fn from_row(row: &OlapRow) -> Self {
        let sign = if row.is_expense { -1.0 } else { 1.0 };
        Self {
            date: row.parsed_date(),
            account: normalize_account(row.account_name.as_deref().unwrap_or_default()),
            category: normalize_category(row.category_name.as_deref()),
            amount: row.amount * sign,
        }
    }
}

/// Sum of movements by `(account, category)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CashflowTable {
    cells: BTreeMap<(String, String), f64>,
}

impl CashflowTable {
    /// Builds the pivot from movements.
    #[must_use]
    pub fn from_movements(movements: &[Movement]) -> Self {
        let mut cells = BTreeMap::new();
        for m in movements {
            *cells
                .entry((m.account.clone(), m.category.clone()))
                .or_insert(0.0) += m.amount;
        }
        Self { cells }
    }

    /// Returns the sum for a cell, zero if absent.
    #[must_use]
    pub fn get(&self, account: &str, category: &str) -> f64 {
        self.cells
            .get(&(account.to_owned(), category.to_owned()))
            .copied()
            .unwrap_or(0.0)
    }

    /// Sum over all cells.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.cells.values().sum()
    }

    /// Sum over one account.
    #[must_use]
    pub fn account_total(&self, account: &str) -> f64 {
        self.cells
            .iter()
            .filter(|((acc, _), _)| acc == account)
            .map(|(_, v)| v)
            .sum()
    }

    /// Distinct categories, sorted.
    #[must_use]
    pub fn categories(&self) -> BTreeSet<String> {
        self.cells.keys().map(|(_, cat)| cat.clone()).collect()
    }

    /// Pivot rows in `(account, category)` order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.cells
            .iter()
            .map(|((acc, cat), v)| (acc.as_str(), cat.as_str(), *v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
