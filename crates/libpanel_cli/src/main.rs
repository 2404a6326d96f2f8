//! CLI probe for a library panel database.
//!
//! # Responsibility
//! - Open (and bootstrap) a panel database file.
//! - Print the panels of one organization as JSON lines.
//!
//! Usage: `libpanel_cli <db_path> <org_id>`
//! Environment: `LIBPANEL_LOG_DIR` enables file logging,
//! `LIBPANEL_LOG_LEVEL` overrides the default level.

use libpanel_core::db::open_db;
use libpanel_core::{
    core_version, default_log_level, init_logging, LibraryPanelService, SignedInUser,
    SqliteLibraryPanelRepository,
};
use std::process::ExitCode;

const USAGE: &str = "usage: libpanel_cli <db_path> <org_id>";

fn main() -> ExitCode {
    match run(std::env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("libpanel_cli: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let [db_path, org_id] = args.as_slice() else {
        return Err(USAGE.to_string());
    };
    let org_id: i64 = org_id
        .parse()
        .map_err(|_| format!("org_id must be an integer, got `{org_id}`\n{USAGE}"))?;

    if let Ok(log_dir) = std::env::var("LIBPANEL_LOG_DIR") {
        let level = std::env::var("LIBPANEL_LOG_LEVEL")
            .unwrap_or_else(|_| default_log_level().to_string());
        init_logging(&level, &log_dir)?;
    }
    log::info!("event=cli_start module=cli status=ok version={}", core_version());

    let conn = open_db(db_path).map_err(|err| err.to_string())?;
    let repo = SqliteLibraryPanelRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let service = LibraryPanelService::new(repo);

    // Listing is read-only, so the user id is irrelevant here.
    let user = SignedInUser::new(org_id, 0);
    let panels = service
        .get_all_library_panels(&user)
        .map_err(|err| err.to_string())?;

    for panel in &panels {
        let line = serde_json::to_string(panel).map_err(|err| err.to_string())?;
        println!("{line}");
    }
    Ok(())
}
