//! Network Performance Campaign Runner - Main CLI Application
//!
//! Parses the command line, builds the configuration, runs one campaign on
//! loopback endpoints and prints the summary. Exits 0 when every threshold
//! passed, 1 otherwise.

use clap::Parser;
use netperf_campaign::{
    campaign::Campaign,
    cli::Cli,
    config::{display_config_summary, load_config, EnvManager},
    error::{AppError, ErrorReporter, Result},
    logging::{LogLevel, LoggerFactory},
    models::CampaignResult,
    network::LocalNetworkProvider,
    output::ConsoleReporter,
    version_banner,
};
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Report only; campaign phases recover from panics by unwinding
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
    }));

    let cli = Cli::parse();
    let reporter = ErrorReporter::new(!cli.no_color, cli.verbose);

    if cli.is_info_request() {
        if let Err(e) = show_info(&cli) {
            reporter.report_error(&e);
            process::exit(e.exit_code());
        }
        return;
    }

    match run_application(cli).await {
        Ok(result) => process::exit(if result.passed { 0 } else { 1 }),
        Err(e) => {
            reporter.report_error(&e);
            print_error_suggestions(&e);
            process::exit(e.exit_code());
        }
    }
}

/// Handle the flags that print help material instead of running
fn show_info(cli: &Cli) -> Result<()> {
    if cli.env_help {
        println!("{}", EnvManager::display_env_help());
    }
    if let Some(path) = &cli.write_env_example {
        EnvManager::save_example_env_file(path)?;
        println!("Example environment file written to {}", path.display());
    }
    Ok(())
}

/// Main application logic
async fn run_application(cli: Cli) -> Result<CampaignResult> {
    if cli.debug {
        println!("{}", version_banner());
        println!();
    }

    let json_output = cli.json;
    let verbose = cli.verbose;
    let explicit_level = cli.requested_log_level().is_some();

    let mut config = load_config(cli)?;

    // Keep stdout clean for the JSON document
    if json_output && !explicit_level {
        config.logging.level = config.logging.level.max(LogLevel::Warn);
    }

    let factory = LoggerFactory::console(config.logging.clone());
    let logger = factory.create_logger("CAMPAIGN").await;

    if config.logging.level <= LogLevel::Debug {
        logger.debug(&format!("Configuration loaded:\n{}", display_config_summary(&config)))
            .log()
            .await;
    }

    let provider = Arc::new(LocalNetworkProvider::new(logger.named("NETWORK")));
    let enable_color = config.logging.enable_color;

    let mut campaign = Campaign::new(config, provider, logger);
    if !json_output {
        campaign = campaign.with_reporter(Arc::new(ConsoleReporter::new(enable_color, verbose)));
    }

    let result = campaign.run().await;

    if json_output {
        let document = serde_json::to_string_pretty(&result)
            .map_err(|e| AppError::internal(format!("Failed to serialize campaign result: {}", e)))?;
        println!("{}", document);
    }

    Ok(result)
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check your .env file format");
            eprintln!("  - Ports must be non-zero and iterations between 1 and 100");
            eprintln!("  - Run with --env-help to list the supported environment variables");
            for warning in EnvManager::validate_current_env() {
                eprintln!("  - {}", warning);
            }
        }
        AppError::Process(_) => {
            eprintln!();
            eprintln!("Process troubleshooting:");
            eprintln!("  - Make sure iperf3 is installed and on PATH, or pass --iperf-binary");
        }
        AppError::Transport(_) => {
            eprintln!();
            eprintln!("Network troubleshooting:");
            eprintln!("  - Check that the latency port is free, or use --latency-port 0");
            eprintln!("  - Verify firewall settings for UDP traffic");
        }
        _ => {}
    }
}
