//! Terminal rendering helpers.

use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;

use clicktrail::application::services::short_url;
use clicktrail::domain::entities::Link;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

pub fn heading(title: &str) {
    println!("{}", title.bright_blue().bold());
    println!();
}

pub fn success(message: &str) {
    println!("{}", format!("✅ {message}").green().bold());
}

pub fn cancelled() {
    println!("{}", "❌ Cancelled".red());
}

/// Detailed view of a single link.
pub fn print_link(link: &Link, base_url: &str) {
    println!("  ID:        {}", link.id.to_string().bright_black());
    println!(
        "  Short URL: {}",
        short_url(base_url, &link.short_code).bright_yellow().bold()
    );
    println!("  URL:       {}", link.original_url.cyan());
    if !link.title.is_empty() {
        println!("  Title:     {}", link.title.bright_white());
    }
    if !link.tags.is_empty() {
        println!("  Tags:      {}", link.tags.join(", ").magenta());
    }
    println!(
        "  Clicks:    {}",
        link.clicks.to_string().bright_green().bold()
    );
    println!(
        "  Created:   {}",
        link.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black()
    );
    if let Some(deleted_at) = link.deleted_at {
        println!(
            "  Deleted:   {}",
            deleted_at.format("%Y-%m-%d %H:%M").to_string().red()
        );
    }
    println!();
}

/// One-line-per-link table.
pub fn print_link_table(links: &[Link]) {
    println!(
        "  {:<5} {:<12} {:>8}  {:<30} {}",
        "ID".bright_white().bold(),
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Title".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(90).bright_black());

    for link in links {
        println!(
            "  {:<5} {:<12} {:>8}  {:<30} {}",
            link.id.to_string().bright_black(),
            link.short_code.cyan(),
            link.clicks.to_string().bright_green(),
            truncate(&link.title, 30),
            link.original_url
        );
    }
    println!();
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        let mut out: String = value.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
