//! Database diagnostics.

use anyhow::Result;
use colored::*;

use clicktrail::AppState;

use super::DbAction;

pub async fn handle(action: DbAction, state: &AppState) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            let pool = state.db.as_ref();
            sqlx::query("SELECT 1").fetch_one(pool).await?;

            let version: String = sqlx::query_scalar("SELECT sqlite_version()")
                .fetch_one(pool)
                .await?;
            let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE deleted_at IS NULL")
                .fetch_one(pool)
                .await?;
            let visits: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM visits")
                .fetch_one(pool)
                .await?;
            let collections: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM collections")
                .fetch_one(pool)
                .await?;

            println!("{}", "✅ Database connection OK".green().bold());
            println!();
            println!("  SQLite:      {}", version.bright_white());
            println!("  Links:       {}", links.to_string().bright_green().bold());
            println!("  Visits:      {}", visits.to_string().bright_green().bold());
            println!(
                "  Collections: {}",
                collections.to_string().bright_green().bold()
            );
            println!();
        }
    }

    Ok(())
}
