//! `link` subcommands.

use anyhow::{Context, Result};
use colored::*;
use dialoguer::Confirm;

use clicktrail::AppState;
use clicktrail::application::pagination::PageRequest;
use clicktrail::application::services::{ShortenRequest, short_url};
use clicktrail::domain::entities::LinkPatch;

use super::LinkAction;
use super::output::{cancelled, heading, print_json, print_link, print_link_table, success};

pub async fn handle(action: LinkAction, state: &AppState, json: bool) -> Result<()> {
    match action {
        LinkAction::Create {
            url,
            title,
            tags,
            code,
        } => {
            let link = state
                .links
                .shorten(ShortenRequest {
                    original_url: url,
                    title,
                    tags,
                    custom_code: code,
                })
                .await
                .context("Failed to create link")?;

            if json {
                return print_json(&link);
            }

            success("Link created");
            println!();
            print_link(&link, &state.base_url);
        }
        LinkAction::List {
            page,
            limit,
            search,
            tag,
        } => {
            let page = state
                .links
                .list(PageRequest::new(page, limit), search, tag)
                .await
                .context("Failed to list links")?;

            if json {
                return print_json(&page);
            }

            heading("🔗 Links");
            if page.items.is_empty() {
                println!("{}", "  No links found".yellow());
                return Ok(());
            }
            print_link_table(&page.items);
            println!(
                "  Page {} of {} ({} links)",
                page.page.to_string().bright_white().bold(),
                page.total_pages().max(1),
                page.total.to_string().bright_white().bold()
            );
        }
        LinkAction::Show { code } => {
            let link = state.links.resolve(&code).await?;

            if json {
                return print_json(&link);
            }

            heading("🔗 Link");
            print_link(&link, &state.base_url);
        }
        LinkAction::Update {
            code,
            url,
            title,
            tags,
            clear_tags,
        } => {
            let link = state.links.resolve(&code).await?;

            let tags = if clear_tags {
                Some(Vec::new())
            } else if tags.is_empty() {
                None
            } else {
                Some(tags)
            };

            let patch = LinkPatch {
                original_url: url,
                title,
                tags,
            };

            let link = state
                .links
                .update(link.id, patch)
                .await
                .context("Failed to update link")?;

            if json {
                return print_json(&link);
            }

            success("Link updated");
            println!();
            print_link(&link, &state.base_url);
        }
        LinkAction::Delete { code, yes } => {
            let link = state.links.resolve(&code).await?;

            if !yes {
                println!(
                    "  {} → {}",
                    short_url(&state.base_url, &link.short_code).cyan(),
                    link.original_url
                );
                println!();

                let confirmed = Confirm::new()
                    .with_prompt("Delete this link?")
                    .default(false)
                    .interact()?;

                if !confirmed {
                    cancelled();
                    return Ok(());
                }
            }

            state
                .links
                .delete(link.id)
                .await
                .context("Failed to delete link")?;

            if json {
                return print_json(&serde_json::json!({ "deleted": link.id }));
            }
            success("Link deleted");
        }
        LinkAction::Restore { id } => {
            let link = state
                .links
                .restore(id)
                .await
                .context("Failed to restore link")?;

            if json {
                return print_json(&link);
            }

            success("Link restored");
            println!();
            print_link(&link, &state.base_url);
        }
    }

    Ok(())
}
