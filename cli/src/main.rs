//! syncgate CLI — check a Lotus node's sync status from the terminal.
//!
//! Usage:
//! ```bash
//! # Check the local node (LOTUS_RPC_URL / LOTUS_RPC_TOKEN are honoured)
//! syncgate check
//!
//! # Check a remote node and print JSON
//! syncgate check --url http://lotus:1234/rpc/v0 --token $TOKEN --json
//!
//! # List sync stages in progress order
//! syncgate stages
//! ```
//!
//! `check` exits with 0 when synced, 2 when still syncing and 1 when the
//! status could not be determined.

use std::env;
use std::process;
use std::time::Duration;

use syncgate_core::{check_sync_status_with_timeout, SyncStage, SyncStatusError};
use syncgate_lotus::wire::stage_code;
use syncgate_lotus::{LotusClient, LotusClientConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const EXIT_NOT_SYNCED: i32 = 2;

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    init_tracing(args.iter().any(|a| a == "--log-json"));

    let result = match args[1].as_str() {
        "check" => cmd_check(&args[2..]).await,
        "stages" => {
            cmd_stages();
            Ok(())
        }
        "version" | "--version" | "-V" => {
            println!("syncgate {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("syncgate {}", env!("CARGO_PKG_VERSION"));
    println!("Check whether a Lotus node is synced and which heights are safe to serve\n");
    println!("USAGE:");
    println!("    syncgate <COMMAND>\n");
    println!("COMMANDS:");
    println!("    check    Query the node and print its aggregated sync status");
    println!("    stages   List sync stages in progress order");
    println!("    version  Print version");
    println!("    help     Print this help\n");
    println!("CHECK FLAGS:");
    println!("    --url <URL>        JSON-RPC endpoint  [env: LOTUS_RPC_URL]");
    println!("    --token <TOKEN>    API token          [env: LOTUS_RPC_TOKEN]");
    println!("    --timeout <SECS>   Deadline for the status query, retries included");
    println!("                       (default: request timeout x attempts + backoff)");
    println!("    --json             Print the status as JSON");
    println!("    --log-json         Emit logs as JSON (filter with RUST_LOG)");
}

/// Install a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
/// Logs go to stderr so `--json` output stays parseable.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn cmd_check(args: &[String]) -> Result<(), String> {
    let mut config = LotusClientConfig::from_env().map_err(|e| e.to_string())?;
    if let Some(url) = parse_flag(args, "--url") {
        config.url = url;
    }
    if let Some(token) = parse_flag(args, "--token") {
        config.token = Some(token);
    }
    let timeout = match parse_flag(args, "--timeout") {
        Some(raw) => Duration::from_secs(
            raw.parse()
                .map_err(|_| format!("--timeout must be a number of seconds, got {raw:?}"))?,
        ),
        None => config.query_budget(),
    };
    let json = args.iter().any(|a| a == "--json");

    let url = config.url.clone();
    let client = LotusClient::new(config).map_err(|e| e.to_string())?;
    tracing::debug!(url = %url, timeout_secs = timeout.as_secs(), "checking sync status");

    match check_sync_status_with_timeout(&client, timeout).await {
        Ok(status) => {
            let report = status.report();
            if json {
                let out = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
                println!("{out}");
            } else {
                println!("Node: {url}");
                println!("  Stage:      {}", report.stage);
                println!("  Synced:     {}", if report.synced { "yes" } else { "no" });
                println!("  Min height: {}", report.min_height);
                println!("  Max height: {}", report.max_height);
                println!("  Workers:    {}", report.tracked_workers);
            }
            if !report.synced {
                process::exit(EXIT_NOT_SYNCED);
            }
            Ok(())
        }
        Err(e) => {
            if json {
                let out = serde_json::json!({
                    "error": error_name(&e),
                    "code": e.code(),
                    "transient": e.is_transient(),
                    "message": e.to_string(),
                });
                println!("{out}");
                process::exit(1);
            }
            Err(e.to_string())
        }
    }
}

fn error_name(err: &SyncStatusError) -> &'static str {
    match err {
        SyncStatusError::UnableToGetSyncStatus { .. } => "unable_to_get_sync_status",
        SyncStatusError::SyncErrored { .. } => "sync_errored",
    }
}

fn cmd_stages() {
    println!("Sync stages (progress order):\n");
    for stage in SyncStage::ALL {
        let note = if stage.is_terminal() { "  terminal" } else { "" };
        println!("  {:<20} lotus code {}{note}", stage.to_string(), stage_code(stage));
    }
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}
