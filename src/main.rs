use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use websrv_scan_rs::flagged::{default_flagged_versions, load_flagged_or_default, FlaggedVersions};
use websrv_scan_rs::logging::{self, LogLevel};
use websrv_scan_rs::output::{self, OutputMethod};
use websrv_scan_rs::server::{self, AppState};
use websrv_scan_rs::transport::ReqwestTransport;
use websrv_scan_rs::types::ServerKind;
use websrv_scan_rs::{ScanConfig, WebServerScanner};

/// websrv-scan — check IPs for flagged web server versions and root directory listings.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "websrv-scan",
    version,
    about = "Checks if the given IPs run a flagged web server software/version (from the Server \
             header) and runs a very simple, unreliable check for a file listing at the root (ip + /).",
    long_about = None
)]
struct Cli {
    /// Space separated IP addresses to scan, optionally with http(s):// and :port.
    #[arg(long, num_args = 1..)]
    ips: Vec<String>,

    /// Skip the web server software check.
    #[arg(long = "disable-scan-software", default_value_t = false)]
    disable_scan_software: bool,

    /// Skip the directory listing check at root.
    #[arg(long = "disable-scan-root", default_value_t = false)]
    disable_scan_root: bool,

    /// Key output by the IPs as given instead of their normalized form.
    #[arg(long = "preserve-ips", default_value_t = false)]
    preserve_ips: bool,

    /// Log level.
    #[arg(long = "log-level", value_enum, default_value_t = LogLevel::Critical)]
    log_level: LogLevel,

    /// How to print output to console.
    #[arg(long = "output-method", value_enum, default_value_t = OutputMethod::Human)]
    output_method: OutputMethod,

    /// Flagged versions file (`software: ver, ver` per line). Defaults are used if missing or empty.
    #[arg(long = "flagged-versions")]
    flagged_versions: Option<PathBuf>,

    /// Also write results as pretty JSON to this path.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Run the scan service on this address (e.g. 127.0.0.1:5000) instead of a one-shot scan.
    #[arg(long)]
    serve: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log = logging::init(cli.log_level)?;

    let flagged = match cli.flagged_versions.as_deref() {
        Some(path) => load_flagged_or_default(path),
        None => default_flagged_versions(),
    };
    tracing::debug!("flagged versions: {}", describe_flagged(&flagged));

    if let Some(bind) = cli.serve.as_deref() {
        let state = AppState::new(Arc::new(ReqwestTransport::new()?), flagged).with_log_handle(log);
        let cancel = CancellationToken::new();
        let cancel_ctrlc = cancel.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            cancel_ctrlc.cancel();
        });
        println!("Scan service starting at http://{} (Ctrl+C to stop)", bind);
        return server::spawn_server(bind, state, cancel).await;
    }

    if cli.ips.is_empty() {
        println!("IPs must be passed.");
        process::exit(1);
    }

    let config = ScanConfig {
        addresses: cli.ips,
        scan_software: !cli.disable_scan_software,
        scan_root: !cli.disable_scan_root,
        preserve_addresses: cli.preserve_ips,
        flagged_versions: flagged,
    };
    let scanner = WebServerScanner::with_default_transport(config)?;

    let results = match scanner.run().await {
        Ok(r) => r,
        Err(e) => {
            println!("Scan not started: {e}");
            process::exit(1);
        }
    };

    println!("{}", output::render(&results, cli.output_method)?);

    if let Some(path) = cli.output.as_deref() {
        if let Err(e) = output::write_results_json(path, &results) {
            eprintln!("Failed to write JSON to {}: {:#}", path.display(), e);
        } else {
            eprintln!("Wrote JSON results to {}", path.display());
        }
    }

    Ok(())
}

fn describe_flagged(flagged: &FlaggedVersions) -> String {
    [ServerKind::Nginx, ServerKind::Iis]
        .iter()
        .map(|k| format!("{k}: [{}]", flagged.versions(*k).collect::<Vec<_>>().join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}
