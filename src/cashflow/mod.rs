//! Cash-flow (ДДС) report model.
//!
//! Normalizes OLAP rows into signed movements, pivots them by account
//! and category, renders text tables and exports spreadsheets.

mod model;
mod report;
pub mod xlsx;

pub use model::{
    ACCOUNT_FINANCIAL, ACCOUNT_OPERATIONAL, CashflowTable, Movement, normalize_account,
    normalize_category,
};
pub use report::CashflowReport;
