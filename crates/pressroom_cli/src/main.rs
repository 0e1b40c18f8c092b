//! `pressroom` command-line entry point.
//!
//! # Responsibility
//! - Expose article creation, paginated listing and cursor tools locally.
//! - Resolve settings as flags > `pressroom.toml` > defaults.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pressroom_core::db::open_db;
use pressroom_core::{
    decode_cursor, encode_cursor, init_logging, load_config, ArticleInput, ArticleService,
    ArticlesPageRequest, PressroomConfig, SqliteArticleRepository,
};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pressroom", version)]
#[command(about = "Create and page through articles stored in SQLite")]
struct Cli {
    /// Config file (defaults to ./pressroom.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for log files; logging is off when unset
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an article, creating its author on first use
    Create {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        body: String,

        #[arg(short, long)]
        author: String,
    },

    /// List articles newest first
    List {
        /// Page size (default 10, max 100)
        #[arg(short, long)]
        first: Option<u32>,

        /// Continue after this cursor (an `endCursor` from a previous page)
        #[arg(long)]
        after: Option<String>,

        /// Full-text query over title and body
        #[arg(short, long)]
        query: Option<String>,

        /// Case-insensitive author name substring
        #[arg(short, long)]
        author: Option<String>,
    },

    /// Encode or decode pagination cursors
    Cursor {
        #[command(subcommand)]
        action: CursorAction,
    },
}

#[derive(Subcommand)]
enum CursorAction {
    Encode {
        #[arg(long)]
        id: i64,

        /// Unix epoch seconds
        #[arg(long)]
        created_at: i64,
    },
    Decode { token: String },
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let file_config = load_config(cli.config.as_deref())?.unwrap_or_default();
    let config = file_config.merged_with(PressroomConfig {
        database: cli.database,
        log_level: cli.log_level,
        log_dir: cli.log_dir,
    });

    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(config.log_level_or_default(), log_dir)
            .map_err(anyhow::Error::msg)
            .context("failed to initialize logging")?;
    }

    match cli.command {
        Commands::Create {
            title,
            body,
            author,
        } => {
            let conn = open_database(&config)?;
            let service = ArticleService::new(SqliteArticleRepository::try_new(&conn)?);
            let article = service.create_article(&ArticleInput::new(title, body, author))?;
            print_json(&article)?;
        }
        Commands::List {
            first,
            after,
            query,
            author,
        } => {
            let conn = open_database(&config)?;
            let service = ArticleService::new(SqliteArticleRepository::try_new(&conn)?);
            let page = service.get_articles_page(&ArticlesPageRequest {
                first,
                after,
                query,
                author,
            })?;
            print_json(&page)?;
        }
        Commands::Cursor { action } => match action {
            CursorAction::Encode { id, created_at } => {
                println!("{}", encode_cursor(id, created_at));
            }
            CursorAction::Decode { token } => {
                let (id, created_at) = decode_cursor(&token)?;
                print_json(&json!({ "id": id, "createdAt": created_at }))?;
            }
        },
    }

    Ok(())
}

fn open_database(config: &PressroomConfig) -> anyhow::Result<Connection> {
    let path = config.database_or_default();
    open_db(&path).with_context(|| format!("failed to open database `{}`", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
