use libpanel_core::db::migrations::latest_version;
use libpanel_core::db::{
    open_db, open_db_in_memory, with_transactional_db_session, DbError, DbResult,
};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_panel_table() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "library_panel");
}

#[test]
fn reopening_a_file_keeps_schema_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("panels.db");

    let first = open_db(&path).unwrap();
    first
        .execute(
            "INSERT INTO library_panel
                (org_id, folder_id, title, model, created, created_by, updated, updated_by)
             VALUES (1, 0, 'kept', '{}', 1, 1, 1, 1);",
            [],
        )
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second), latest_version());
    let count: i64 = second
        .query_row("SELECT COUNT(*) FROM library_panel;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn duplicate_org_folder_title_violates_unique_constraint() {
    let conn = open_db_in_memory().unwrap();
    let insert = "INSERT INTO library_panel
            (org_id, folder_id, title, model, created, created_by, updated, updated_by)
         VALUES (1, 5, 'A', '{}', 1, 1, 1, 1);";

    conn.execute(insert, []).unwrap();
    let err = DbError::from(conn.execute(insert, []).unwrap_err());

    assert!(err.is_unique_violation());
}

#[test]
fn failed_transactional_session_leaves_no_partial_writes() {
    let conn = open_db_in_memory().unwrap();

    let result: DbResult<()> = with_transactional_db_session(&conn, |session| {
        session.execute(
            "INSERT INTO library_panel
                (org_id, folder_id, title, model, created, created_by, updated, updated_by)
             VALUES (1, 5, 'A', '{}', 1, 1, 1, 1);",
            [],
        )?;
        // Same key again; the constraint aborts the whole session.
        session.execute(
            "INSERT INTO library_panel
                (org_id, folder_id, title, model, created, created_by, updated, updated_by)
             VALUES (1, 5, 'A', '{}', 2, 2, 2, 2);",
            [],
        )?;
        Ok(())
    });

    assert!(result.unwrap_err().is_unique_violation());
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM library_panel;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
