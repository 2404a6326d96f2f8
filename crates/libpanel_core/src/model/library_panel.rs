//! Library panel domain model.
//!
//! # Responsibility
//! - Define the persisted library panel record and its create command.
//! - Validate create input before it reaches storage.
//!
//! # Invariants
//! - `(org_id, folder_id, title)` identifies at most one panel.
//! - `id` is assigned by storage and never reused for another panel.
//! - `model` is opaque to core; it is stored and returned verbatim.

use crate::context::{OrgId, SignedInUser, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned panel identifier.
pub type PanelId = i64;

/// Folder identifier. `0` is the general (root) folder.
pub type FolderId = i64;

/// Maximum title width accepted by the `library_panel.title` column.
pub const TITLE_MAX_CHARS: usize = 150;

/// Reusable dashboard panel definition scoped to one organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryPanel {
    /// Assigned on insert; `0` until persisted.
    pub id: PanelId,
    pub org_id: OrgId,
    pub folder_id: FolderId,
    pub title: String,
    /// Panel JSON as sent by the dashboard editor.
    pub model: Value,
    /// Unix epoch milliseconds.
    pub created: i64,
    /// Unix epoch milliseconds.
    pub updated: i64,
    pub created_by: UserId,
    pub updated_by: UserId,
}

impl LibraryPanel {
    /// Builds an unpersisted panel owned by `user`, stamped at `now_ms`.
    pub fn from_command(
        user: &SignedInUser,
        command: &CreateLibraryPanelCommand,
        now_ms: i64,
    ) -> Self {
        Self {
            id: 0,
            org_id: user.org_id,
            folder_id: command.folder_id,
            title: command.title.clone(),
            model: command.model.clone(),
            created: now_ms,
            updated: now_ms,
            created_by: user.user_id,
            updated_by: user.user_id,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id > 0
    }
}

/// Input for creating a library panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLibraryPanelCommand {
    pub folder_id: FolderId,
    pub title: String,
    pub model: Value,
}

impl CreateLibraryPanelCommand {
    pub fn new(folder_id: FolderId, title: impl Into<String>, model: Value) -> Self {
        Self {
            folder_id,
            title: title.into(),
            model,
        }
    }

    /// Checks the command before any SQL is issued.
    ///
    /// # Errors
    /// - `EmptyTitle` when the title is blank after trimming.
    /// - `TitleTooLong` when the title exceeds [`TITLE_MAX_CHARS`].
    pub fn validate(&self) -> Result<(), LibraryPanelValidationError> {
        if self.title.trim().is_empty() {
            return Err(LibraryPanelValidationError::EmptyTitle);
        }

        let length = self.title.chars().count();
        if length > TITLE_MAX_CHARS {
            return Err(LibraryPanelValidationError::TitleTooLong {
                length,
                max: TITLE_MAX_CHARS,
            });
        }

        Ok(())
    }
}

/// Reasons a create command is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryPanelValidationError {
    EmptyTitle,
    TitleTooLong { length: usize, max: usize },
}

impl Display for LibraryPanelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "library panel title cannot be empty"),
            Self::TitleTooLong { length, max } => write!(
                f,
                "library panel title has {length} characters; maximum is {max}"
            ),
        }
    }
}

impl Error for LibraryPanelValidationError {}
