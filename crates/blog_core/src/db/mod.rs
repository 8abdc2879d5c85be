//! SQLite storage bootstrap, schema migration and transaction helpers.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the blog core.
//! - Apply schema migrations in deterministic order.
//! - Provide scoped savepoints so multi-statement writes commit or roll back
//!   as one unit.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Category `1` (`uncategorized`) exists once migrations succeed.
//! - Core code must not read/write application data before migrations succeed.

use log::warn;
use rusqlite::{Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use migrations::init_schema;
pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Returns whether the failure is lock contention that may clear on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Sqlite(err) => is_transient(err),
            Self::UnsupportedSchemaVersion { .. } => false,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Classifies SQLite busy/locked failures.
pub fn is_transient(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => matches!(
            failure.code,
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
        ),
        _ => false,
    }
}

/// Runs `f` inside a named SAVEPOINT on `conn`.
///
/// The savepoint is released when `f` succeeds and rolled back when it fails,
/// so every statement issued by `f` lands together or not at all. Works both
/// on a bare connection (the savepoint opens its own transaction) and nested
/// inside an outer transaction.
///
/// On a bare connection the final `RELEASE` is the commit. When it fails
/// (e.g. `SQLITE_BUSY`), the whole transaction is rolled back so the
/// connection is back in autocommit mode before the error is returned.
///
/// `name` must be a plain SQL identifier.
pub fn with_savepoint<T, E, F>(conn: &Connection, name: &'static str, f: F) -> Result<T, E>
where
    F: FnOnce(&Connection) -> Result<T, E>,
    E: From<rusqlite::Error>,
{
    let outermost = conn.is_autocommit();
    conn.execute_batch(&format!("SAVEPOINT {name};"))?;
    match f(conn) {
        Ok(value) => match conn.execute_batch(&format!("RELEASE {name};")) {
            Ok(()) => Ok(value),
            Err(err) => {
                abandon_savepoint(conn, name, outermost);
                Err(err.into())
            }
        },
        Err(err) => {
            abandon_savepoint(conn, name, outermost);
            Err(err)
        }
    }
}

fn abandon_savepoint(conn: &Connection, name: &str, outermost: bool) {
    let sql = if outermost {
        // SQLite may already have rolled the transaction back on its own.
        if conn.is_autocommit() {
            return;
        }
        "ROLLBACK;".to_string()
    } else {
        format!("ROLLBACK TO {name}; RELEASE {name};")
    };
    if let Err(rollback_err) = conn.execute_batch(&sql) {
        warn!(
            "event=savepoint_rollback module=db status=error savepoint={} error={}",
            name, rollback_err
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{is_transient, with_savepoint};
    use rusqlite::{ffi, Connection};
    use std::time::Duration;

    fn scratch() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (v INTEGER NOT NULL);")
            .unwrap();
        conn
    }

    fn count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM t;", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn savepoint_releases_on_success() {
        let conn = scratch();
        with_savepoint::<_, rusqlite::Error, _>(&conn, "sp_ok", |conn| {
            conn.execute("INSERT INTO t (v) VALUES (1);", [])?;
            conn.execute("INSERT INTO t (v) VALUES (2);", [])?;
            Ok(())
        })
        .unwrap();
        assert_eq!(count(&conn), 2);
        assert!(conn.is_autocommit());
    }

    #[test]
    fn savepoint_rolls_back_every_statement_on_error() {
        let conn = scratch();
        let result = with_savepoint::<(), rusqlite::Error, _>(&conn, "sp_fail", |conn| {
            conn.execute("INSERT INTO t (v) VALUES (1);", [])?;
            conn.execute("INSERT INTO t (v) VALUES (NULL);", [])?;
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(count(&conn), 0);
        assert!(conn.is_autocommit());
    }

    #[test]
    fn nested_savepoint_rollback_keeps_outer_work() {
        let mut conn = scratch();
        let tx = conn.transaction().unwrap();
        tx.execute("INSERT INTO t (v) VALUES (1);", []).unwrap();
        let inner = with_savepoint::<(), rusqlite::Error, _>(&tx, "sp_inner", |conn| {
            conn.execute("INSERT INTO t (v) VALUES (2);", [])?;
            Err(rusqlite::Error::QueryReturnedNoRows)
        });
        assert!(inner.is_err());
        tx.commit().unwrap();
        assert_eq!(count(&conn), 1);
    }

    #[test]
    fn failed_release_rolls_back_and_restores_autocommit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("release.db");
        let writer = Connection::open(&path).unwrap();
        writer
            .execute_batch("CREATE TABLE t (v INTEGER NOT NULL);")
            .unwrap();
        writer.busy_timeout(Duration::ZERO).unwrap();

        let reader = Connection::open(&path).unwrap();
        reader.execute_batch("BEGIN;").unwrap();
        let seen: i64 = reader
            .query_row("SELECT COUNT(*) FROM t;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(seen, 0);

        let result = with_savepoint::<(), rusqlite::Error, _>(&writer, "sp_busy", |conn| {
            conn.execute("INSERT INTO t (v) VALUES (1);", [])?;
            Ok(())
        });
        let err = result.unwrap_err();
        assert!(is_transient(&err));
        assert!(writer.is_autocommit());

        reader.execute_batch("COMMIT;").unwrap();
        writer.execute("INSERT INTO t (v) VALUES (2);", []).unwrap();
        drop(writer);

        let reopened = Connection::open(&path).unwrap();
        let values: Vec<i64> = reopened
            .prepare("SELECT v FROM t;")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(values, vec![2]);
    }

    #[test]
    fn busy_and_locked_are_transient() {
        let busy = rusqlite::Error::SqliteFailure(ffi::Error::new(ffi::SQLITE_BUSY), None);
        let locked = rusqlite::Error::SqliteFailure(ffi::Error::new(ffi::SQLITE_LOCKED), None);
        let constraint =
            rusqlite::Error::SqliteFailure(ffi::Error::new(ffi::SQLITE_CONSTRAINT), None);
        assert!(is_transient(&busy));
        assert!(is_transient(&locked));
        assert!(!is_transient(&constraint));
        assert!(!is_transient(&rusqlite::Error::QueryReturnedNoRows));
    }
}
