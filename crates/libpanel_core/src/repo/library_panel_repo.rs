//! Library panel repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/delete/get/get-all over the `library_panel` table.
//! - Keep SQL and row decoding inside the persistence boundary.
//!
//! # Invariants
//! - Every statement is filtered by the caller's `org_id`.
//! - Create checks and inserts inside one immediate transaction.
//! - A UNIQUE violation on insert is reported as `AlreadyExists`.
//! - Persisted rows that cannot be decoded are rejected, never masked.

use crate::context::{OrgId, SignedInUser};
use crate::db::migrations::{current_version, latest_version};
use crate::db::{with_db_session, with_transactional_db_session, DbError};
use crate::model::library_panel::{
    CreateLibraryPanelCommand, FolderId, LibraryPanel, LibraryPanelValidationError, PanelId,
};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

const PANEL_SELECT_SQL: &str = "SELECT
    id,
    org_id,
    folder_id,
    title,
    model,
    created,
    created_by,
    updated,
    updated_by
FROM library_panel";

const PANEL_COLUMNS: [&str; 9] = [
    "id",
    "org_id",
    "folder_id",
    "title",
    "model",
    "created",
    "created_by",
    "updated",
    "updated_by",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from library panel persistence operations.
#[derive(Debug)]
pub enum RepoError {
    /// Create command rejected before SQL.
    Validation(LibraryPanelValidationError),
    /// Lower-level store failure, propagated unchanged.
    Db(DbError),
    /// A panel with the same title already exists in the folder.
    AlreadyExists {
        org_id: OrgId,
        folder_id: FolderId,
        title: String,
    },
    /// No panel with this id in the caller's organization.
    NotFound(PanelId),
    /// Persisted row cannot be converted to a valid panel.
    InvalidData(String),
    /// System clock reads before the Unix epoch; no timestamp can be stamped.
    ClockBeforeEpoch,
    /// Connection schema is not at the expected bootstrapped version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

/// Coarse error classes for callers mapping failures to responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryPanelErrorKind {
    AlreadyExists,
    NotFound,
    Invalid,
    StoreFailure,
}

impl RepoError {
    pub fn kind(&self) -> LibraryPanelErrorKind {
        match self {
            Self::AlreadyExists { .. } => LibraryPanelErrorKind::AlreadyExists,
            Self::NotFound(_) => LibraryPanelErrorKind::NotFound,
            Self::Validation(_) => LibraryPanelErrorKind::Invalid,
            Self::Db(_)
            | Self::InvalidData(_)
            | Self::ClockBeforeEpoch
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => LibraryPanelErrorKind::StoreFailure,
        }
    }

    /// Stable snake_case code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::Db(_) => "db_error",
            Self::AlreadyExists { .. } => "already_exists",
            Self::NotFound(_) => "not_found",
            Self::InvalidData(_) => "invalid_data",
            Self::ClockBeforeEpoch => "clock_before_epoch",
            Self::UninitializedConnection { .. } => "uninitialized_connection",
            Self::MissingRequiredTable(_) => "missing_table",
            Self::MissingRequiredColumn { .. } => "missing_column",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::AlreadyExists {
                org_id,
                folder_id,
                title,
            } => write!(
                f,
                "library panel `{title}` already exists in folder {folder_id} of org {org_id}"
            ),
            Self::NotFound(id) => write!(f, "library panel not found: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted library panel data: {message}")
            }
            Self::ClockBeforeEpoch => write!(f, "system clock is set before the unix epoch"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column missing: {table}.{column}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LibraryPanelValidationError> for RepoError {
    fn from(value: LibraryPanelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for library panel operations.
pub trait LibraryPanelRepository {
    /// Persists a new panel owned by `user` and returns it with its id.
    fn create_library_panel(
        &self,
        user: &SignedInUser,
        command: &CreateLibraryPanelCommand,
    ) -> RepoResult<LibraryPanel>;
    /// Hard-deletes one panel of the caller's organization.
    fn delete_library_panel(&self, user: &SignedInUser, panel_id: PanelId) -> RepoResult<()>;
    fn get_library_panel(&self, user: &SignedInUser, panel_id: PanelId)
        -> RepoResult<LibraryPanel>;
    /// Lists the organization's panels in creation order.
    fn get_all_library_panels(&self, user: &SignedInUser) -> RepoResult<Vec<LibraryPanel>>;
}

/// SQLite-backed library panel repository.
pub struct SqliteLibraryPanelRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLibraryPanelRepository<'conn> {
    /// Wraps a bootstrapped connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version is not current.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the table
    ///   shape does not match what queries expect.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl LibraryPanelRepository for SqliteLibraryPanelRepository<'_> {
    fn create_library_panel(
        &self,
        user: &SignedInUser,
        command: &CreateLibraryPanelCommand,
    ) -> RepoResult<LibraryPanel> {
        command.validate()?;

        let now_ms = epoch_ms(SystemTime::now())?;
        let mut panel = LibraryPanel::from_command(user, command, now_ms);
        let model_text = serde_json::to_string(&panel.model)
            .map_err(|err| RepoError::InvalidData(format!("unserializable model: {err}")))?;

        let id = with_transactional_db_session(self.conn, |session| -> RepoResult<PanelId> {
            if title_taken(session, panel.org_id, panel.folder_id, &panel.title)? {
                return Err(already_exists(&panel));
            }

            session
                .execute(
                    "INSERT INTO library_panel (
                        org_id,
                        folder_id,
                        title,
                        model,
                        created,
                        created_by,
                        updated,
                        updated_by
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
                    params![
                        panel.org_id,
                        panel.folder_id,
                        panel.title.as_str(),
                        model_text,
                        panel.created,
                        panel.created_by,
                        panel.updated,
                        panel.updated_by,
                    ],
                )
                .map_err(|err| {
                    let err = DbError::from(err);
                    if err.is_unique_violation() {
                        already_exists(&panel)
                    } else {
                        RepoError::Db(err)
                    }
                })?;

            Ok(session.last_insert_rowid())
        })?;

        panel.id = id;
        Ok(panel)
    }

    fn delete_library_panel(&self, user: &SignedInUser, panel_id: PanelId) -> RepoResult<()> {
        with_transactional_db_session(self.conn, |session| -> RepoResult<()> {
            let changed = session.execute(
                "DELETE FROM library_panel WHERE id = ?1 AND org_id = ?2;",
                params![panel_id, user.org_id],
            )?;

            if changed != 1 {
                return Err(RepoError::NotFound(panel_id));
            }

            Ok(())
        })
    }

    fn get_library_panel(
        &self,
        user: &SignedInUser,
        panel_id: PanelId,
    ) -> RepoResult<LibraryPanel> {
        with_db_session(self.conn, |session| -> RepoResult<LibraryPanel> {
            let mut stmt = session.prepare(&format!(
                "{PANEL_SELECT_SQL}
                 WHERE id = ?1
                   AND org_id = ?2;"
            ))?;

            // `id` is the primary key, so at most one row can match.
            let found = stmt
                .query_row(params![panel_id, user.org_id], |row| {
                    Ok(parse_panel_row(row))
                })
                .optional()?;

            match found {
                Some(parsed) => parsed,
                None => Err(RepoError::NotFound(panel_id)),
            }
        })
    }

    fn get_all_library_panels(&self, user: &SignedInUser) -> RepoResult<Vec<LibraryPanel>> {
        with_db_session(self.conn, |session| -> RepoResult<Vec<LibraryPanel>> {
            let mut stmt = session.prepare(&format!(
                "{PANEL_SELECT_SQL}
                 WHERE org_id = ?1
                 ORDER BY id ASC;"
            ))?;

            let mut rows = stmt.query([user.org_id])?;
            let mut panels = Vec::new();
            while let Some(row) = rows.next()? {
                panels.push(parse_panel_row(row)?);
            }

            Ok(panels)
        })
    }
}

fn title_taken(
    session: &Connection,
    org_id: OrgId,
    folder_id: FolderId,
    title: &str,
) -> RepoResult<bool> {
    let exists: i64 = session.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM library_panel
            WHERE org_id = ?1
              AND folder_id = ?2
              AND title = ?3
        );",
        params![org_id, folder_id, title],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn already_exists(panel: &LibraryPanel) -> RepoError {
    RepoError::AlreadyExists {
        org_id: panel.org_id,
        folder_id: panel.folder_id,
        title: panel.title.clone(),
    }
}

fn parse_panel_row(row: &Row<'_>) -> RepoResult<LibraryPanel> {
    let id: PanelId = row.get("id")?;
    let model_text: String = row.get("model")?;
    let model = serde_json::from_str(&model_text).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid json in library_panel.model for id {id}: {err}"
        ))
    })?;

    Ok(LibraryPanel {
        id,
        org_id: row.get("org_id")?,
        folder_id: row.get("folder_id")?,
        title: row.get("title")?,
        model,
        created: row.get("created")?,
        updated: row.get("updated")?,
        created_by: row.get("created_by")?,
        updated_by: row.get("updated_by")?,
    })
}

fn epoch_ms(now: SystemTime) -> RepoResult<i64> {
    let elapsed = now.duration_since(UNIX_EPOCH).map_err(|err| {
        warn!(
            "event=clock_read module=repo status=error error_code=clock_before_epoch behind_ms={}",
            err.duration().as_millis()
        );
        RepoError::ClockBeforeEpoch
    })?;
    Ok(i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "library_panel")? {
        return Err(RepoError::MissingRequiredTable("library_panel"));
    }

    for column in PANEL_COLUMNS {
        if !table_has_column(conn, "library_panel", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "library_panel",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
