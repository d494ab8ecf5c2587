mod config;
mod engine;
mod feed;
mod geo;
mod render;
mod track;
mod view;
mod web;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "satwatch")]
#[command(about = "Ground station and satellite map tracking engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file
    Check { config: String },
    /// Run the tracking engine and web server
    Serve { config: String },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { config } => check(&config),
        Commands::Serve { config } => serve(&config),
    }
}

fn check(path: &str) -> ExitCode {
    match Config::from_file(path) {
        Ok(config) => {
            println!("Configuration is valid");
            println!("  ground station source: {}", config.sources.ground_station);
            println!("  satellite source:      {}", config.sources.satellite);
            println!(
                "  poll interval:         {}",
                humantime::format_duration(config.sources.poll_interval)
            );
            println!("  default fence radius:  {} m", config.fence.default_radius_m);
            println!("  web bind:              {}", config.web.bind);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn serve(path: &str) -> ExitCode {
    let config = match Config::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Runtime error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(web::run_server(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
