//! Command-line entry point: prints the holder report of a mint.

use anyhow::Result;
use clap::Parser;
use holder_lens::holders::{HolderClass, HolderPipelineBuilder, HolderReportError};
use holder_lens::types::HolderReport;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "holder-lens", about = "Ranked holder report for a Solana token mint")]
struct Cli {
    /// Mint address of the token
    mint: String,

    /// Solana JSON-RPC endpoint
    #[arg(long, env = "HOLDER_LENS_RPC_URL", default_value = holder_lens::holders::types::DEFAULT_RPC_URL)]
    rpc_url: String,

    /// RPC request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Timeout of a single history lookup in seconds
    #[arg(long, default_value_t = 10)]
    history_timeout: u64,

    /// Concurrent history lookups
    #[arg(long, default_value_t = 10)]
    concurrency: usize,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Print a table instead of JSON
    #[arg(long)]
    summary: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout only carries the report
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    let pipeline = HolderPipelineBuilder::new()
        .with_rpc_url(cli.rpc_url.clone())
        .with_rpc_timeout(cli.timeout)
        .with_history_timeout(cli.history_timeout)
        .with_max_concurrent_enrichments(cli.concurrency)
        .build_rpc()?;

    info!("Using RPC endpoint {}", cli.rpc_url);

    match pipeline.compute_holder_report(&cli.mint).await {
        Ok(report) => {
            if cli.summary {
                print_summary(&report);
            } else {
                print_json(&report, cli.pretty)?;
            }
            Ok(())
        }
        Err(e) => {
            print_json(&e.to_body(), cli.pretty)?;
            std::process::exit(exit_code(&e));
        }
    }
}

fn exit_code(error: &HolderReportError) -> i32 {
    match error {
        HolderReportError::InvalidArgument(_) => 2,
        HolderReportError::SourceUnavailable { .. } => 1,
    }
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

fn print_summary(report: &HolderReport) {
    if report.is_empty() {
        println!("No holders found");
        return;
    }

    println!(
        "{:>4}  {:<44}  {:>8}  {:<14}  {:>4}  {:<16}  {:<16}",
        "#", "address", "share", "class", "txs", "first seen", "last seen"
    );
    for (i, holder) in report.holders.iter().enumerate() {
        println!(
            "{:>4}  {:<44}  {:>7.2}%  {:<14}  {:>4}  {:<16}  {:<16}",
            i + 1,
            holder.address,
            holder.percentage,
            HolderClass::of(holder).as_str(),
            holder.transaction_count,
            format_timestamp(holder.first_transaction),
            format_timestamp(holder.last_transaction),
        );
    }

    if !report.enrichment_failures.is_empty() {
        println!();
        for failure in &report.enrichment_failures {
            println!("history unavailable for {}: {}", failure.address, failure.error);
        }
    }
}

fn format_timestamp(seconds: u64) -> String {
    if seconds == 0 {
        return "-".to_string();
    }
    chrono::DateTime::from_timestamp(seconds as i64, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}
