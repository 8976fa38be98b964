//! `collection` subcommands.

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input};

use clicktrail::AppState;
use clicktrail::application::pagination::PageRequest;
use clicktrail::domain::entities::{Collection, CollectionUpdate, NewCollection};

use super::CollectionAction;
use super::output::{cancelled, heading, print_json, print_link_table, success};

pub async fn handle(action: CollectionAction, state: &AppState, json: bool) -> Result<()> {
    match action {
        CollectionAction::Create {
            slug,
            title,
            description,
        } => {
            let title = match title {
                Some(t) => t,
                None => Input::new()
                    .with_prompt("Collection title")
                    .allow_empty(true)
                    .interact_text()?,
            };

            let collection = state
                .collections
                .create(NewCollection {
                    slug,
                    title,
                    description,
                })
                .await
                .context("Failed to create collection")?;

            if json {
                return print_json(&collection);
            }
            success(&format!("Collection '{}' created", collection.slug));
        }
        CollectionAction::Show { slug } => {
            let collection = state.collections.get_by_slug(&slug).await?;

            if json {
                return print_json(&collection);
            }
            print_collection(&collection);
        }
        CollectionAction::List {
            page,
            limit,
            search,
        } => {
            let page = state
                .collections
                .list(PageRequest::new(page, limit), search)
                .await
                .context("Failed to list collections")?;

            if json {
                return print_json(&page);
            }

            heading("📚 Collections");
            if page.items.is_empty() {
                println!("{}", "  No collections found".yellow());
                return Ok(());
            }

            for collection in &page.items {
                println!(
                    "  {:<5} {:<24} {}",
                    collection.id.to_string().bright_black(),
                    collection.slug.cyan(),
                    collection.title
                );
            }
            println!();
            println!(
                "  Total: {}",
                page.total.to_string().bright_white().bold()
            );
        }
        CollectionAction::Update {
            slug,
            new_slug,
            title,
            description,
        } => {
            let current = state.collections.get_by_slug(&slug).await?;

            let update = CollectionUpdate {
                slug: new_slug.unwrap_or(current.slug),
                title: title.unwrap_or(current.title),
                description: description.unwrap_or(current.description),
            };

            let collection = state
                .collections
                .update(current.id, update)
                .await
                .context("Failed to update collection")?;

            if json {
                return print_json(&collection);
            }
            success(&format!("Collection '{}' updated", collection.slug));
        }
        CollectionAction::Delete { slug, yes } => {
            let collection = state.collections.get_by_slug(&slug).await?;

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!(
                        "Delete collection '{}' ({} links)?",
                        collection.slug,
                        collection.links.len()
                    ))
                    .default(false)
                    .interact()?;

                if !confirmed {
                    cancelled();
                    return Ok(());
                }
            }

            state.collections.delete(collection.id).await?;

            if json {
                return print_json(&serde_json::json!({ "deleted": collection.id }));
            }
            success("Collection deleted");
        }
        CollectionAction::Add { slug, code } => {
            let collection = state.collections.get_by_slug(&slug).await?;
            let link = state.links.resolve(&code).await?;

            state
                .collections
                .add_link(collection.id, link.id)
                .await
                .context("Failed to add link")?;

            if !json {
                success(&format!("Added {} to '{}'", link.short_code, collection.slug));
            }
        }
        CollectionAction::Remove { slug, code } => {
            let collection = state.collections.get_by_slug(&slug).await?;
            let link = state.links.resolve(&code).await?;

            state
                .collections
                .remove_link(collection.id, link.id)
                .await
                .context("Failed to remove link")?;

            if !json {
                success(&format!(
                    "Removed {} from '{}'",
                    link.short_code, collection.slug
                ));
            }
        }
        CollectionAction::Reorder { slug, codes } => {
            let collection = state.collections.get_by_slug(&slug).await?;

            let mut ids = Vec::with_capacity(codes.len());
            for code in &codes {
                ids.push(state.links.resolve(code).await?.id);
            }

            state
                .collections
                .reorder(collection.id, ids)
                .await
                .context("Failed to reorder collection")?;

            let collection = state.collections.get(collection.id).await?;
            if json {
                return print_json(&collection);
            }
            print_collection(&collection);
        }
    }

    Ok(())
}

fn print_collection(collection: &Collection) {
    heading(&format!("📚 {}", collection.slug));
    if !collection.title.is_empty() {
        println!("  {}", collection.title.bright_white().bold());
    }
    if !collection.description.is_empty() {
        println!("  {}", collection.description);
    }
    println!();

    if collection.links.is_empty() {
        println!("{}", "  No links yet".yellow());
        println!();
    } else {
        print_link_table(&collection.links);
    }
}
