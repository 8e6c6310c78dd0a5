use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use reqwest::Client;
use tracing::info;

use crate::apollo::{ApolloClient, ApolloError};
use crate::contact::{DEFAULT_LIMIT, QueryError, SearchQuery};
use crate::enrich::{DEFAULT_PACING, find_contacts};
use crate::export::{ExportError, render_table, write_csv};
use crate::web::{self, AppState};

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Global HTTP client timeout covering DNS + connect + response body.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser, Debug)]
#[command(name = "contact-finder")]
#[command(about = "Find company contacts by domain and job title, with email/phone enrichment")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search once and print the results as a table
    Search(SearchArgs),
    /// Serve the search form over HTTP
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Company domain (e.g. tcs.com)
    #[arg(short, long)]
    pub domain: String,

    /// Job title keyword (e.g. "HR Manager")
    #[arg(short = 't', long = "title")]
    pub designation: String,

    /// Person/organization location filter (e.g. Mumbai or "New York")
    #[arg(short, long)]
    pub location: Option<String>,

    /// How many results to return (1-10)
    #[arg(short = 'n', long, default_value_t = u32::from(DEFAULT_LIMIT))]
    pub limit: u32,

    /// Also write the results to this CSV file
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Pause between people in milliseconds (0 disables)
    #[arg(long, default_value_t = DEFAULT_PACING.as_millis() as u64)]
    pub delay_ms: u64,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8501")]
    pub addr: String,

    /// Pause between people in milliseconds (0 disables)
    #[arg(long, default_value_t = DEFAULT_PACING.as_millis() as u64)]
    pub delay_ms: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Apollo(#[from] ApolloError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

fn http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(HTTP_TIMEOUT)
        .build()
}

pub async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Search(args) => search(args).await,
        Command::Serve(args) => serve(args).await,
    }
}

async fn search(args: SearchArgs) -> Result<(), CliError> {
    let query = SearchQuery::new(
        &args.domain,
        &args.designation,
        args.location.as_deref(),
        Some(args.limit),
    )?;
    let client = ApolloClient::from_env(http_client()?)?;

    let contacts =
        find_contacts(&client, &query, Duration::from_millis(args.delay_ms)).await?;

    if contacts.is_empty() {
        println!("No matching people found.");
        return Ok(());
    }

    println!("{}:\n", query.summary(contacts.len()));
    print!("{}", render_table(&contacts));

    if let Some(path) = &args.csv {
        write_csv(&contacts, path)?;
        println!("\nSaved CSV to {}", path.display());
    }
    Ok(())
}

async fn serve(args: ServeArgs) -> Result<(), CliError> {
    let client = ApolloClient::from_env(http_client()?)?;
    let state = AppState {
        client,
        pacing: Duration::from_millis(args.delay_ms),
    };
    info!(addr = %args.addr, "starting web form");
    web::serve(&args.addr, state).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_flags() {
        let cli = Cli::try_parse_from([
            "contact-finder",
            "search",
            "--domain",
            "tcs.com",
            "--title",
            "HR Manager",
            "--location",
            "Mumbai",
            "-n",
            "3",
            "--csv",
            "out.csv",
        ])
        .unwrap();

        let Command::Search(args) = cli.command else {
            panic!("expected search command");
        };
        assert_eq!(args.domain, "tcs.com");
        assert_eq!(args.designation, "HR Manager");
        assert_eq!(args.location.as_deref(), Some("Mumbai"));
        assert_eq!(args.limit, 3);
        assert_eq!(args.csv, Some(PathBuf::from("out.csv")));
        assert_eq!(args.delay_ms, 1000);
    }

    #[test]
    fn search_requires_domain_and_title() {
        assert!(Cli::try_parse_from(["contact-finder", "search", "--domain", "tcs.com"]).is_err());
    }

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from(["contact-finder", "serve"]).unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve command");
        };
        assert_eq!(args.addr, "127.0.0.1:8501");
        assert_eq!(args.delay_ms, 1000);
    }

    #[tokio::test]
    async fn blank_domain_fails_before_any_request() {
        let cli = Cli::try_parse_from([
            "contact-finder",
            "search",
            "--domain",
            " ",
            "--title",
            "CTO",
        ])
        .unwrap();
        let err = run(cli).await.unwrap_err();
        assert!(matches!(err, CliError::Query(QueryError::MissingField)));
    }
}
