//! Cash-flow Report Bot Library
//!
//! A Telegram bot that builds daily cash-flow (ДДС) spreadsheets from
//! iiko OLAP transactions.
//!
//! This crate provides the core functionality for:
//! - Loading configuration from the environment
//! - Fetching OLAP transactions from an iiko server
//! - Pivoting movements into cash-flow tables and XLSX workbooks
//! - Driving the inline menu and calendar dialog over Telegram
//! - Running as a container entrypoint with signal-driven shutdown

pub mod bot;
pub mod cashflow;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod iiko;
pub mod keyboard;
pub mod lifecycle;
pub mod logging;
pub mod reports;
pub mod telegram;
