mod apollo;
mod cli;
mod contact;
mod enrich;
mod export;
mod web;

pub const USER_AGENT: &str = concat!("contact-finder/", env!("CARGO_PKG_VERSION"));

use std::process::ExitCode;

use clap::Parser;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("contact_finder=info".parse()?),
        )
        .init();

    let cli = cli::Cli::parse();
    match cli::run(cli).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("Error: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}
