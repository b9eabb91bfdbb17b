//! Paisa CLI - expense tracking from free-form notes
//!
//! Usage:
//!   paisa analyze "coffee 150 yesterday, Uber 450 today"
//!   paisa summary           Show the current month
//!   paisa budget 15000      Set the monthly budget
//!   paisa serve --port 3000 Start the extraction proxy

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (warn, the CLI
    // output itself is println)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let db_path = commands::resolve_db_path(cli.db.as_deref())?;

    match cli.command {
        Commands::Analyze {
            text,
            file,
            image,
            server,
            dry_run,
        } => {
            commands::cmd_analyze(
                &db_path,
                text.as_deref(),
                &file,
                &image,
                server.as_deref(),
                dry_run,
            )
            .await
        }
        Commands::Add {
            item,
            price,
            category,
            date,
            income,
        } => commands::cmd_add(&db_path, &item, price, &category, date.as_deref(), income).await,
        Commands::List { limit, month } => {
            commands::cmd_list(&db_path, limit, month.as_deref()).await
        }
        Commands::Edit {
            id,
            item,
            category,
            price,
            date,
        } => commands::cmd_edit(&db_path, id, item, category, price, date).await,
        Commands::Delete { id } => commands::cmd_delete(&db_path, id).await,
        Commands::Summary { month } => commands::cmd_summary(&db_path, month.as_deref()).await,
        Commands::Watch => commands::cmd_watch(&db_path).await,
        Commands::Budget { amount } => commands::cmd_budget(&db_path, amount).await,
        Commands::Export { output } => commands::cmd_export(&db_path, output.as_deref()).await,
        Commands::Serve {
            port,
            host,
            origin,
            mock,
        } => commands::cmd_serve(&host, port, origin, mock).await,
    }
}
