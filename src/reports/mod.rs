//! Report generation module.
//!
//! Turns a user's day or period choice into OLAP fetches and a
//! spreadsheet on disk.

mod plan;
mod service;

pub use plan::{DateRange, DayReportPlan, ReportRequest};
pub use service::{GeneratedReport, IikoSource, OlapSource, ReportError, ReportService};
