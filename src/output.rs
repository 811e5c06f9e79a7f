use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::*;

use crate::types::ResultMap;

/// How results are printed to the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputMethod {
    #[default]
    #[value(name = "HUMAN")]
    Human,
    #[value(name = "JSON")]
    Json,
}

pub fn render(results: &ResultMap, method: OutputMethod) -> Result<String> {
    match method {
        OutputMethod::Human => Ok(render_human(results)),
        OutputMethod::Json => render_json(results),
    }
}

/// One block per address; failed scans get an extra red error section.
pub fn render_human(results: &ResultMap) -> String {
    let mut msg = String::new();
    for (address, r) in results.iter() {
        msg.push_str(&format!(
            "\n\n{}\n{} {}\n{} {}",
            address.cyan().bold(),
            "Web server software:".bold(),
            r.software,
            "Root listing:".bold(),
            r.listing,
        ));
        if !r.is_good() {
            msg.push_str(&format!(
                "\n{}\n{} {}\n{} {}",
                "Error occurred during scan.".red().bold(),
                "Error name:".red().bold(),
                r.status,
                "Error message:".red().bold(),
                r.detail.as_deref().unwrap_or("none"),
            ));
        }
    }
    msg
}

pub fn render_json(results: &ResultMap) -> Result<String> {
    serde_json::to_string_pretty(results).context("failed to serialize results")
}

pub fn write_results_json(path: &Path, results: &ResultMap) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, results)?;
    Ok(())
}
