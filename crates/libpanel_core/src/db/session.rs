//! Session scopes over one SQLite connection.
//!
//! # Responsibility
//! - Run read paths against the bare connection.
//! - Run write paths inside a single `BEGIN IMMEDIATE` transaction.
//!
//! # Invariants
//! - A transactional scope commits only when the closure returns `Ok`.
//! - Any `Err` from the closure (or from commit) leaves no partial writes.

use log::debug;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Runs `f` with a non-transactional session.
pub fn with_db_session<T, E, F>(conn: &Connection, f: F) -> Result<T, E>
where
    F: FnOnce(&Connection) -> Result<T, E>,
{
    f(conn)
}

/// Runs `f` inside an immediate transaction on `conn`.
///
/// The write lock is taken up front, so check-then-write sequences inside
/// `f` observe no concurrent writer. The transaction is rolled back when
/// `f` fails.
///
/// # Errors
/// - Errors from `BEGIN`/`COMMIT` are converted through `From<rusqlite::Error>`.
/// - Errors from `f` are returned unchanged.
pub fn with_transactional_db_session<T, E, F>(conn: &Connection, f: F) -> Result<T, E>
where
    E: From<rusqlite::Error>,
    F: FnOnce(&Connection) -> Result<T, E>,
{
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    match f(&tx) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(err) => {
            debug!("event=db_session module=db status=rollback");
            // Dropping an uncommitted transaction rolls it back.
            drop(tx);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{with_db_session, with_transactional_db_session};
    use rusqlite::Connection;

    fn scratch_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (v INTEGER NOT NULL);")
            .unwrap();
        conn
    }

    fn row_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM t;", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn transactional_session_commits_on_ok() {
        let conn = scratch_conn();

        with_transactional_db_session(&conn, |session| -> rusqlite::Result<()> {
            session.execute("INSERT INTO t (v) VALUES (1);", [])?;
            session.execute("INSERT INTO t (v) VALUES (2);", [])?;
            Ok(())
        })
        .unwrap();

        assert_eq!(row_count(&conn), 2);
    }

    #[test]
    fn transactional_session_rolls_back_on_err() {
        let conn = scratch_conn();

        let result = with_transactional_db_session(&conn, |session| -> rusqlite::Result<()> {
            session.execute("INSERT INTO t (v) VALUES (1);", [])?;
            Err(rusqlite::Error::QueryReturnedNoRows)
        });

        assert!(result.is_err());
        assert_eq!(row_count(&conn), 0);
        assert!(conn.is_autocommit());
    }

    #[test]
    fn plain_session_passes_value_through() {
        let conn = scratch_conn();
        let value: i64 = with_db_session(&conn, |session| {
            session.query_row("SELECT 7;", [], |row| row.get(0))
        })
        .unwrap();
        assert_eq!(value, 7);
    }
}
