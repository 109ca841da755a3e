//! Cash-flow Report Bot - Main Entry Point
//!
//! Runs the Telegram bot as the container's main process until SIGTERM or
//! SIGINT arrives.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info};

use cashflow_report_bot::bot::BotApp;
use cashflow_report_bot::commands::CommandHandler;
use cashflow_report_bot::config::{BotSettings, IikoConfig, LogFormat, TelegramConfig};
use cashflow_report_bot::dispatcher::{DialogStore, Dispatcher};
use cashflow_report_bot::iiko::IikoClient;
use cashflow_report_bot::lifecycle::{EXIT_FAILURE, Supervisor, TerminationListener};
use cashflow_report_bot::logging;
use cashflow_report_bot::reports::{IikoSource, ReportService};
use cashflow_report_bot::telegram::{RetryPolicy, TelegramBot};

/// Telegram bot sending daily cash-flow reports from iiko.
#[derive(Parser, Debug)]
#[command(name = "cashflow_bot")]
#[command(about = "Send iiko cash-flow (ДДС) reports to Telegram")]
#[command(version)]
struct Args {
    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let env_loaded = dotenvy::from_filename(&args.env_file);
    logging::init(&args.log_level, LogFormat::from_env());
    if let Err(e) = env_loaded {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("Startup failed: {:#}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

async fn run() -> Result<u8> {
    let tg_config = TelegramConfig::from_env()
        .context("Failed to load Telegram configuration from environment")?;
    let iiko_config =
        IikoConfig::from_env().context("Failed to load iiko configuration from environment")?;
    let settings = BotSettings::from_env_with_defaults();
    debug!("{:?}", settings);

    // Installed before any network I/O so a signal during startup is not lost
    let listener = TerminationListener::install().context("Failed to install signal handlers")?;

    let reason = Supervisor::new(settings.shutdown_grace())
        .run(
            |mut shutdown| async move {
                let retry = RetryPolicy::new(settings.send_retries, settings.send_retry_delay());
                let (telegram, updates) = tokio::select! {
                    connected = TelegramBot::connect(&tg_config, retry) => {
                        connected.context("Failed to connect to Telegram")?
                    }
                    () = shutdown.wait() => {
                        info!("Shutdown requested while connecting");
                        return Ok(());
                    }
                };
                let telegram = Arc::new(telegram);

                let iiko = IikoClient::new(iiko_config).context("Failed to create iiko client")?;
                let reports = ReportService::new(
                    Arc::new(IikoSource::new(iiko)),
                    settings.report_output_dir.clone(),
                );
                let commands = CommandHandler::new(Arc::new(DialogStore::new()));
                let app = Arc::new(BotApp::new(
                    Arc::clone(&telegram),
                    commands,
                    reports,
                    settings.keep_reports,
                ));

                info!("Bot is running. Send /start to the bot.");
                let result = Dispatcher::new(updates, app).run(shutdown).await;
                telegram.disconnect();
                result?;
                anyhow::Ok(())
            },
            listener.recv(),
        )
        .await;

    Ok(reason.exit_code())
}
