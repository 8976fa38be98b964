//! `visit`, `stats` and `dashboard` commands.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use colored::*;
use serde_json::json;

use clicktrail::AppState;
use clicktrail::application::services::DashboardQuery;
use clicktrail::domain::entities::{LinkFilter, StatsWindow, end_of_day, start_of_day};
use clicktrail::domain::visit_event::VisitEvent;

use super::output::{heading, print_json, print_link_table, success};

/// Records one visit the way a redirect handler would: resolve, enqueue,
/// then drain the worker before exiting.
pub async fn visit(
    state: &AppState,
    code: &str,
    referrer: Option<String>,
    user_agent: Option<String>,
    ip: Option<String>,
    json: bool,
) -> Result<()> {
    let link = state.links.resolve(code).await?;

    let (queue, mut worker) = state.spawn_visit_worker();
    let mut failures = worker.take_failures();

    let event = VisitEvent::new(link.id, referrer.as_deref(), user_agent.as_deref(), ip);
    let queued = queue.enqueue(event);
    drop(queue);

    let report = worker.drain().await;

    let failure = failures.as_mut().and_then(|rx| rx.try_recv().ok());
    if let Some(failure) = failure {
        return Err(failure.error).context("Failed to record visit");
    }
    if !queued {
        anyhow::bail!("Visit queue rejected the event");
    }

    if json {
        return print_json(&json!({
            "link_id": link.id,
            "recorded": report.recorded,
            "failed": report.failed,
        }));
    }

    success(&format!("Visit recorded for {}", link.short_code));
    Ok(())
}

pub async fn stats(
    state: &AppState,
    code: &str,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    json: bool,
) -> Result<()> {
    let stats = state
        .stats
        .get_link_stats_by_code(code, StatsWindow::new(from, to))
        .await
        .context("Failed to load statistics")?;

    if json {
        return print_json(&stats);
    }

    heading(&format!("📊 Statistics for {}", stats.short_code));
    println!(
        "  Total clicks: {}",
        stats.total_clicks.to_string().bright_green().bold()
    );
    println!();

    println!("{}", "  Top referrers".bright_white().bold());
    if stats.referrers.is_empty() {
        println!("{}", "    No visits yet".yellow());
    }
    for entry in &stats.referrers {
        println!(
            "    {:>6}  {}",
            entry.count.to_string().bright_green(),
            entry.referrer.cyan()
        );
    }
    println!();

    println!("{}", "  Daily clicks".bright_white().bold());
    for day in &stats.daily {
        println!(
            "    {}  {:>6}",
            day.date.to_string().bright_black(),
            day.count.to_string().bright_green()
        );
    }
    println!();

    Ok(())
}

pub async fn dashboard(
    state: &AppState,
    limit: Option<i64>,
    search: Option<String>,
    tag: Option<String>,
    domain: Option<String>,
    json: bool,
) -> Result<()> {
    let dashboard = state
        .stats
        .get_dashboard(DashboardQuery {
            limit,
            filter: LinkFilter {
                search,
                tag,
                url_contains: domain,
            },
        })
        .await
        .context("Failed to load dashboard")?;

    if json {
        return print_json(&dashboard);
    }

    heading("🏆 Dashboard");
    println!(
        "  Total clicks: {}",
        dashboard.total_clicks.to_string().bright_green().bold()
    );
    println!();

    if dashboard.links.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }
    print_link_table(&dashboard.links);

    Ok(())
}

/// Parses a window start; a bare date means midnight UTC.
pub fn parse_from(value: &str) -> Result<DateTime<Utc>, String> {
    parse_bound(value, start_of_day)
}

/// Parses an inclusive window end; a bare date covers that whole day.
pub fn parse_to(value: &str) -> Result<DateTime<Utc>, String> {
    parse_bound(value, end_of_day)
}

fn parse_bound(
    value: &str,
    on_date: fn(NaiveDate) -> DateTime<Utc>,
) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(on_date)
        .map_err(|_| format!("expected RFC 3339 timestamp or YYYY-MM-DD, got '{value}'"))
}
