//! Library panel use-case service.
//!
//! # Responsibility
//! - Provide the entry points API callers hold for library panels.
//! - Emit one metadata-only log event per operation.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Titles and model payloads never appear in log lines.

use crate::context::SignedInUser;
use crate::model::library_panel::{CreateLibraryPanelCommand, LibraryPanel, PanelId};
use crate::repo::library_panel_repo::{LibraryPanelRepository, RepoResult};
use log::{info, warn};
use std::time::Instant;

/// Use-case facade over a library panel repository.
pub struct LibraryPanelService<R: LibraryPanelRepository> {
    repo: R,
}

impl<R: LibraryPanelRepository> LibraryPanelService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a panel in the caller's organization.
    ///
    /// # Errors
    /// - `Validation` for a blank or overlong title.
    /// - `AlreadyExists` when the folder already holds the title.
    pub fn create_library_panel(
        &self,
        user: &SignedInUser,
        command: &CreateLibraryPanelCommand,
    ) -> RepoResult<LibraryPanel> {
        let started_at = Instant::now();
        let result = self.repo.create_library_panel(user, command);
        match &result {
            Ok(panel) => info!(
                "event=library_panel_create module=service status=ok org_id={} folder_id={} panel_id={} duration_ms={}",
                user.org_id,
                panel.folder_id,
                panel.id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=library_panel_create module=service status=error org_id={} folder_id={} duration_ms={} error_code={}",
                user.org_id,
                command.folder_id,
                started_at.elapsed().as_millis(),
                err.code()
            ),
        }
        result
    }

    /// Deletes one panel of the caller's organization.
    pub fn delete_library_panel(&self, user: &SignedInUser, panel_id: PanelId) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.repo.delete_library_panel(user, panel_id);
        log_outcome("library_panel_delete", user, panel_id, started_at, &result);
        result
    }

    pub fn get_library_panel(
        &self,
        user: &SignedInUser,
        panel_id: PanelId,
    ) -> RepoResult<LibraryPanel> {
        let started_at = Instant::now();
        let result = self.repo.get_library_panel(user, panel_id);
        log_outcome("library_panel_get", user, panel_id, started_at, &result);
        result
    }

    /// Lists every panel of the caller's organization in creation order.
    pub fn get_all_library_panels(&self, user: &SignedInUser) -> RepoResult<Vec<LibraryPanel>> {
        let started_at = Instant::now();
        let result = self.repo.get_all_library_panels(user);
        match &result {
            Ok(panels) => info!(
                "event=library_panel_get_all module=service status=ok org_id={} count={} duration_ms={}",
                user.org_id,
                panels.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=library_panel_get_all module=service status=error org_id={} duration_ms={} error_code={}",
                user.org_id,
                started_at.elapsed().as_millis(),
                err.code()
            ),
        }
        result
    }
}

fn log_outcome<T>(
    event: &str,
    user: &SignedInUser,
    panel_id: PanelId,
    started_at: Instant,
    result: &RepoResult<T>,
) {
    match result {
        Ok(_) => info!(
            "event={} module=service status=ok org_id={} panel_id={} duration_ms={}",
            event,
            user.org_id,
            panel_id,
            started_at.elapsed().as_millis()
        ),
        Err(err) => warn!(
            "event={} module=service status=error org_id={} panel_id={} duration_ms={} error_code={}",
            event,
            user.org_id,
            panel_id,
            started_at.elapsed().as_millis(),
            err.code()
        ),
    }
}
