//! `export` and `import` commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::*;
use dialoguer::Confirm;

use clicktrail::AppState;
use clicktrail::application::services::transfer_service::parse_records;

use super::output::{cancelled, heading, print_json, success};

pub async fn export(state: &AppState, output: Option<PathBuf>) -> Result<()> {
    let records = state
        .transfer
        .export()
        .await
        .context("Failed to export links")?;

    let text = serde_json::to_string_pretty(&records).context("Failed to serialize links")?;

    match output {
        Some(path) => {
            std::fs::write(&path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{}",
                format!("✅ Exported {} links to {}", records.len(), path.display()).green()
            );
        }
        None => println!("{text}"),
    }

    Ok(())
}

pub async fn import(state: &AppState, file: &Path, yes: bool, json: bool) -> Result<()> {
    let input = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let records = parse_records(&input)?;

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Import {} links?", records.len()))
            .default(true)
            .interact()?;

        if !confirmed {
            cancelled();
            return Ok(());
        }
    }

    let report = state
        .transfer
        .import(records)
        .await
        .context("Import aborted")?;

    if json {
        return print_json(&report);
    }

    heading("📥 Import");
    println!(
        "  Imported: {}",
        report.imported.to_string().bright_green().bold()
    );
    println!("  Skipped:  {}", report.skipped.to_string().yellow());
    println!("  Failed:   {}", report.failed.len().to_string().red());
    for failure in &report.failed {
        println!("    {} {}", failure.short_code.cyan(), failure.reason);
    }
    println!();

    if report.failed.is_empty() {
        success("Import finished");
    }

    Ok(())
}
