//! HRMS console: command-line front end over the session, access-control,
//! and resource layers.

use clap::Parser;
use tokio::sync::broadcast;
use tracing_subscriber::{EnvFilter, fmt};

mod commands;
mod output;

use commands::Cli;
use hrms_client::HrmsClient;
use hrms_core::config::{AppConfig, LogFormat};
use hrms_core::events::{EventPayload, SessionEvent};
use hrms_core::{AppError, ConsoleEvent};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(&cli, &config).await {
        output::print_error(&e.message);
        std::process::exit(1);
    }
}

/// Load the base configuration, the environment overlay, and `HRMS__*`
/// variables.
fn load_configuration(cli: &Cli) -> Result<AppConfig, AppError> {
    let overlay = format!("config/{}", cli.env);
    AppConfig::load_from(&cli.config, Some(&overlay))
}

/// Initialize tracing on stderr so command output stays clean on stdout.
fn init_logging(config: &AppConfig) {
    let logging = &config.logging;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(logging.with_target)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .with_env_filter(filter)
                .with_target(logging.with_target)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

async fn run(cli: &Cli, config: &AppConfig) -> Result<(), AppError> {
    let client = HrmsClient::from_config(config)?;
    let mut events = client.events().subscribe();

    let result = cli.execute(&client).await;
    report_events(&mut events);
    result
}

/// Show notices and forced logouts raised while the command ran.
fn report_events(events: &mut broadcast::Receiver<ConsoleEvent>) {
    while let Ok(event) = events.try_recv() {
        match event.payload {
            EventPayload::Notice(notice) => output::print_warning(notice.text()),
            EventPayload::Session(SessionEvent::LoggedOut { reason, redirect_to }) => {
                tracing::debug!(%reason, %redirect_to, "Session ended");
            }
            EventPayload::Session(_) => {}
        }
    }
}
