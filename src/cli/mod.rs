//! Command-line interface definitions and dispatch.

mod collections;
mod db;
mod links;
mod output;
mod reports;
mod transfer;

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use clicktrail::AppState;

/// Shorten URLs, record visits and inspect click analytics.
#[derive(Parser)]
#[command(name = "clicktrail")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Print results as JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
pub enum Commands {
    /// Manage short links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Record a visit for a short code through the visit queue
    Visit {
        code: String,

        #[arg(long)]
        referrer: Option<String>,

        #[arg(long)]
        user_agent: Option<String>,

        /// Caller IP; stored only as a salted hash
        #[arg(long)]
        ip: Option<String>,
    },

    /// Show click statistics for a short code
    Stats {
        code: String,

        /// Start of the window (RFC 3339 or YYYY-MM-DD)
        #[arg(long, value_parser = reports::parse_from)]
        from: Option<DateTime<Utc>>,

        /// End of the window, inclusive (RFC 3339 or YYYY-MM-DD)
        #[arg(long, value_parser = reports::parse_to)]
        to: Option<DateTime<Utc>>,
    },

    /// Show the most clicked links and the total click count
    Dashboard {
        /// Number of links to show (default 10, max 100)
        #[arg(short, long, allow_hyphen_values = true)]
        limit: Option<i64>,

        /// Substring of the link title
        #[arg(short, long)]
        search: Option<String>,

        #[arg(short, long)]
        tag: Option<String>,

        /// Substring of the original URL, e.g. github.com
        #[arg(short, long)]
        domain: Option<String>,
    },

    /// Manage link collections
    Collection {
        #[command(subcommand)]
        action: CollectionAction,
    },

    /// Export every link as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import links from a JSON export
    Import {
        file: PathBuf,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Link management subcommands.
#[derive(Subcommand)]
pub enum LinkAction {
    /// Shorten a URL
    Create {
        url: String,

        #[arg(long, default_value = "")]
        title: String,

        /// Tag to attach; repeat for several tags
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Custom short code (3-32 chars of letters, digits, - and _)
        #[arg(short, long)]
        code: Option<String>,
    },

    /// List live links, newest first
    List {
        #[arg(short, long, default_value_t = 1, allow_hyphen_values = true)]
        page: i64,

        #[arg(short, long, default_value_t = 10, allow_hyphen_values = true)]
        limit: i64,

        /// Substring of the title or URL
        #[arg(short, long)]
        search: Option<String>,

        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Show a link
    Show { code: String },

    /// Edit a link's URL, title or tags
    Update {
        code: String,

        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        title: Option<String>,

        /// Replacement tags; repeat for several tags
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Remove every tag
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
    },

    /// Soft-delete a link; its visits are kept
    Delete {
        code: String,

        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Restore a soft-deleted link by id
    Restore { id: i64 },
}

/// Collection subcommands. Collections are addressed by slug.
#[derive(Subcommand)]
pub enum CollectionAction {
    /// Create an empty collection
    Create {
        slug: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// Show a collection and its links
    Show { slug: String },

    /// List collections
    List {
        #[arg(short, long, default_value_t = 1, allow_hyphen_values = true)]
        page: i64,

        #[arg(short, long, default_value_t = 10, allow_hyphen_values = true)]
        limit: i64,

        /// Substring of the title or slug
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Change a collection's slug, title or description
    Update {
        slug: String,

        #[arg(long)]
        new_slug: Option<String>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a collection; its links are kept
    Delete {
        slug: String,

        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Append a link to a collection
    Add { slug: String, code: String },

    /// Remove a link from a collection
    Remove { slug: String, code: String },

    /// Set the display order of links, first to last
    Reorder {
        slug: String,

        #[arg(required = true)]
        codes: Vec<String>,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
pub enum DbAction {
    /// Check database connection and show row counts
    Check,
}

/// Dispatches a parsed command.
pub async fn run(command: Commands, state: &AppState, json: bool) -> Result<()> {
    match command {
        Commands::Link { action } => links::handle(action, state, json).await,
        Commands::Visit {
            code,
            referrer,
            user_agent,
            ip,
        } => reports::visit(state, &code, referrer, user_agent, ip, json).await,
        Commands::Stats { code, from, to } => reports::stats(state, &code, from, to, json).await,
        Commands::Dashboard {
            limit,
            search,
            tag,
            domain,
        } => reports::dashboard(state, limit, search, tag, domain, json).await,
        Commands::Collection { action } => collections::handle(action, state, json).await,
        Commands::Export { output } => transfer::export(state, output).await,
        Commands::Import { file, yes } => transfer::import(state, &file, yes, json).await,
        Commands::Db { action } => db::handle(action, state).await,
    }
}
