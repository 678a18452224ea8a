mod cli;
mod config;
mod deserialise;
mod download;
mod export;
mod range;
mod reading;

use std::process::ExitCode;

use clap::Parser;
use cli::{command, setup_logging, Cli, Commands};
use config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.log_level());

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Summary {
            from,
            to,
            format,
            output_dir,
        } => command::summary(from, to, format, output_dir, &config)
            .await
            .map(|filename| format!("File saved to `{}`", filename)),
        Commands::Station { station_id } => command::station(&station_id, &config)
            .await
            .map(|details| details.to_string()),
    };

    match result {
        Ok(message) => {
            println!("{}", message);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
