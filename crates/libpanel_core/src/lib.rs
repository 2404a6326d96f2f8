//! Core persistence logic for library panels.
//! This crate is the single source of truth for panel invariants.

pub mod context;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use context::{OrgId, SignedInUser, UserId};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::library_panel::{
    CreateLibraryPanelCommand, FolderId, LibraryPanel, LibraryPanelValidationError, PanelId,
};
pub use repo::library_panel_repo::{
    LibraryPanelErrorKind, LibraryPanelRepository, RepoError, RepoResult,
    SqliteLibraryPanelRepository,
};
pub use service::library_panel_service::LibraryPanelService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
