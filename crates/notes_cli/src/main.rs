//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `notes_core` linkage and that the notes store opens and migrates.
//! - Keep output deterministic for quick local sanity checks.

use clap::Parser;
use notes_core::db::{migrations::latest_version, open_db, open_db_in_memory};
use notes_core::{NoteService, PageRequest, SqliteNoteRepository};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;

/// Opens a notes store and reports its schema version and note count
#[derive(Parser, Debug)]
#[command(name = "notes_cli")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Store file; an in-memory store is used when omitted
    db_path: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, env = "NOTES_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error; defaults by build mode
    #[arg(long, env = "NOTES_LOG_LEVEL")]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    println!("notes_core ping={}", notes_core::ping());
    println!("notes_core version={}", notes_core::core_version());

    if let Some(log_dir) = &cli.log_dir {
        let level = cli
            .log_level
            .as_deref()
            .unwrap_or_else(|| notes_core::default_log_level());
        if let Err(err) = notes_core::init_logging(level, &log_dir.to_string_lossy()) {
            eprintln!("logging disabled: {err}");
        }
    }

    let opened = match &cli.db_path {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    };
    let conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            log::error!("event=store_check module=cli status=error error={err}");
            eprintln!("notes store unavailable: {err}");
            return ExitCode::FAILURE;
        }
    };

    let listed = SqliteNoteRepository::try_new(&conn)
        .map(NoteService::new)
        .map_err(|err| err.to_string())
        .and_then(|service| {
            service
                .list_notes(&BTreeSet::new(), PageRequest::default())
                .map_err(|err| err.to_string())
        });
    match listed {
        Ok(page) => {
            println!(
                "notes store ok schema_version={} notes={}",
                latest_version(),
                page.total_items
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("notes store check failed: {err}");
            ExitCode::FAILURE
        }
    }
}
