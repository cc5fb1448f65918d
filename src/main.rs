use std::path::PathBuf;
use std::process::ExitCode;

use ateco_extractor::{
    CompanyClient, Error, Result, SearchParams, export_to_xlsx, flatten_record,
    sanitize_ateco_code,
};
use clap::Parser;
use tracing::debug;

/// Environment variable consulted when `--token` is omitted
const TOKEN_ENV_VAR: &str = "OPENAPI_TOKEN";

#[derive(Parser)]
#[command(name = "ateco-extractor")]
#[command(
    version,
    about = "Export Italian company records by ATECO code and province from the OpenAPI Company API to XLSX"
)]
struct Cli {
    /// Primary ATECO code to search for (e.g. 1071 or 10.71)
    #[arg(long)]
    ateco: String,

    /// Two-letter province code
    #[arg(long, default_value = "VR")]
    province: String,

    /// OpenAPI bearer token; read from the OPENAPI_TOKEN environment
    /// variable when omitted
    #[arg(long)]
    token: Option<String>,

    /// Destination path of the XLSX file
    #[arg(long, default_value = "companies.xlsx")]
    output: PathBuf,

    /// Page size per request (the API allows up to 100)
    #[arg(long, default_value_t = 100)]
    limit: u32,

    /// Maximum number of records to download across all pages (default: all)
    #[arg(long)]
    max_records: Option<u64>,

    /// Filter by activity status (e.g. ATTIVA)
    #[arg(long)]
    activity_status: Option<String>,

    /// Enrichment dataset to include in each record
    #[arg(
        long,
        default_value = "Advanced",
        value_parser = ["", "Start", "Advanced", "Address", "Pec", "Shareholders"],
    )]
    data_enrichment: String,

    /// Query the sandbox environment instead of production
    #[arg(long)]
    sandbox: bool,

    /// Only report how many records match, without downloading them
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(cli.verbose >= 2)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let token = cli
        .token
        .or_else(|| std::env::var(TOKEN_ENV_VAR).ok())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "an OpenAPI token is required via --token or the {TOKEN_ENV_VAR} environment variable"
            ))
        })?;

    let ateco = sanitize_ateco_code(&cli.ateco)?;
    let province = cli.province.to_uppercase();
    let client = CompanyClient::new(&token, cli.sandbox)?;

    if cli.dry_run {
        let total = client
            .dry_run_count(&cli.province, &ateco, cli.activity_status.as_deref())
            .await?;
        println!("{total} companies available for ATECO {ateco} in province {province}.");
        return Ok(());
    }

    let mut params = SearchParams::new(&cli.province, &ateco)?;
    params.data_enrichment = cli.data_enrichment;
    params.limit = cli.limit;
    params.activity_status = cli.activity_status;

    let mut cursor = client.search(params, cli.max_records)?;
    let mut rows = Vec::new();
    while let Some(record) = cursor.try_next().await? {
        rows.push(flatten_record(&record));
    }
    debug!(records = rows.len(), "download complete");

    let count = export_to_xlsx(&rows, &cli.output)?;
    println!(
        "Saved {count} companies with ATECO code {ateco} in province {province} to '{}'.",
        cli.output.display()
    );
    Ok(())
}
