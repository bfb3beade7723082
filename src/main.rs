mod cli;
mod config;
mod db;
mod error;
mod models;
mod prayer_times;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use db::migrations::run_migrations;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    // Ensure data directory exists and open DB
    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;

    // The resolution worker opens its own connection to the same file
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    // Run migrations on every startup
    run_migrations(&conn)?;

    match cli.command {
        Some(Commands::Times { at }) => {
            handlers::handle_times(&conn, &config, at)?;
        }
        Some(Commands::Mark { prayer, undo, day }) => {
            handlers::handle_mark(&conn, &config, prayer, undo, day)?;
        }
        Some(Commands::History { days }) => {
            handlers::handle_history(&conn, days)?;
        }
        Some(Commands::Export) => {
            handlers::handle_export(&conn)?;
        }
        Some(Commands::Config { init, clear_cache }) => {
            handlers::handle_config(&conn, &config, init, clear_cache)?;
        }

        // No subcommand → launch TUI
        None => {
            tui::app::run(conn, config, db_path)?;
        }
    }

    Ok(())
}
