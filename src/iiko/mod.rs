//! iiko server API module.
//!
//! Authenticates against the iiko server and pulls OLAP reports
//! that feed the cash-flow spreadsheets.

mod client;
mod olap;

pub use client::{IikoClient, IikoError};
pub use olap::{OlapRow, rows_from_response, transactions_request};
