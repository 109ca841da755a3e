//! Standalone report preview.
//!
//! Builds a cash-flow report straight from iiko, prints the tables and writes
//! the workbook, without touching Telegram.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::Parser;
use tracing::debug;

use cashflow_report_bot::cashflow::CashflowReport;
use cashflow_report_bot::config::{IikoConfig, LogFormat};
use cashflow_report_bot::iiko::IikoClient;
use cashflow_report_bot::logging;
use cashflow_report_bot::reports::{IikoSource, ReportRequest, ReportService};

/// Cash-flow report preview.
#[derive(Parser, Debug)]
#[command(name = "report_preview")]
#[command(about = "Builds an iiko cash-flow report and prints it")]
#[command(version)]
struct Args {
    /// Single day report (YYYY-MM-DD).
    #[arg(long, conflicts_with_all = ["from", "to"])]
    day: Option<NaiveDate>,

    /// First day of a period (YYYY-MM-DD).
    #[arg(long, requires = "to")]
    from: Option<NaiveDate>,

    /// Last day of a period (YYYY-MM-DD).
    #[arg(long, requires = "from")]
    to: Option<NaiveDate>,

    /// Directory for the workbook; created when missing.
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Print every movement, not only the totals.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let env_loaded = dotenvy::from_filename(&args.env_file);
    logging::init("warn", LogFormat::Text);
    if let Err(e) = env_loaded {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    let request = match (args.day, args.from, args.to) {
        (Some(day), _, _) => ReportRequest::Day(day),
        (None, Some(from), Some(to)) => ReportRequest::Period { from, to },
        _ => {
            eprintln!("✗ Pass either --day or --from and --to");
            return ExitCode::FAILURE;
        }
    };

    let config = match IikoConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ Failed to load iiko configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let client = match IikoClient::new(config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ Failed to create iiko client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let service = ReportService::new(Arc::new(IikoSource::new(client)), &args.out);
    println!("{}\n", request.caption());

    let report = match service.build(&request).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("✗ Failed to build report: {e}");
            return ExitCode::FAILURE;
        }
    };

    print_report(&report, &request, args.verbose);

    match service.write(&request, report).await {
        Ok(generated) => {
            println!("✓ Workbook written to: {}", generated.path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Failed to write workbook: {e}");
            ExitCode::FAILURE
        }
    }
}

fn print_report(report: &CashflowReport, request: &ReportRequest, verbose: bool) {
    match request {
        ReportRequest::Day(_) => {
            println!("{}", report.previous_text());
            println!("{}", report.current_text());
        }
        ReportRequest::Period { .. } => println!("{}", report.render_period_lines()),
    }

    if verbose {
        println!("{}", report.render_detailed_lines());
    }
}
