mod cli;
mod commands;
mod config;
mod output;

use crate::{
    cli::{Args, Commands, OutputFormat},
    commands::CommandExecutor,
    config::AppConfig,
};
use clap::Parser;
use colored::*;
use std::process;
use tracing::{Level, debug, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let output = args.output;

    init_logging(args.verbose, args.quiet);

    if let Err(e) = run(args).await {
        match output {
            OutputFormat::Json => {
                let error_json = serde_json::json!({
                    "status": "error",
                    "message": format!("{e:#}"),
                });
                println!("{error_json}");
            }
            OutputFormat::Pretty => {
                error!("Application error: {:#}", e);
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            }
        }
        process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = AppConfig::load(args.config.as_deref())?;
    debug!("Loaded configuration: {:?}", config);

    if let Commands::Config { show } = args.command {
        if show {
            print!("{}", config.show()?);
        } else {
            match AppConfig::default_path() {
                Some(path) => println!("Configuration file: {}", path.display()),
                None => println!("No configuration directory on this platform"),
            }
            println!("Use --show to display the current configuration");
        }
        return Ok(());
    }

    let executor = CommandExecutor::new(
        config,
        args.cookies.as_deref(),
        args.cookie_string.as_deref(),
        args.timeout,
        args.output,
    )?;

    match args.command {
        Commands::Newsletter {
            url,
            action,
            paging,
        } => executor.newsletter(&url, action, paging).await,
        Commands::Post { url, content, full } => executor.post(&url, content, full).await,
        Commands::User {
            handle,
            raw,
            subscriptions,
            no_redirects,
        } => {
            executor
                .user(&handle, raw, subscriptions, no_redirects)
                .await
        }
        Commands::Resolve { handle } => executor.resolve(&handle).await,
        Commands::Config { .. } => Ok(()),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(verbose),
        )
        .init();
}
