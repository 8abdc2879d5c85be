//! Entry repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide list/get/create/update/delete over `entries`.
//! - Serve the public index and the admin draft/post listings.
//!
//! # Invariants
//! - Listings are ordered newest id first.
//! - `update_entry` overwrites all mutable fields and never touches tags.
//! - `delete_entry` removes the entry's tag associations with the row.

use crate::db::with_savepoint;
use crate::model::category::CategoryId;
use crate::model::entry::{Entry, EntryFields, EntryId, EntryStatus, EntrySummary};
use crate::repo::{ensure_tables_ready, RecordKind, RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, Params, Row};

const ENTRY_SELECT_SQL: &str = "SELECT
    e.id,
    e.title,
    e.text,
    e.status,
    e.category_id
FROM entries e";

/// Repository interface for entry operations.
pub trait EntryRepository {
    /// Published entries, newest first.
    fn list_published(&self) -> RepoResult<Vec<Entry>>;
    /// Draft id/title pairs, newest first.
    fn list_drafts(&self) -> RepoResult<Vec<EntrySummary>>;
    /// Published id/title pairs, newest first.
    fn list_posts(&self) -> RepoResult<Vec<EntrySummary>>;
    /// Published entries filed under one category, newest first.
    fn list_published_in_category(&self, category_id: CategoryId) -> RepoResult<Vec<Entry>>;
    /// Published entries carrying one tag (exact name match), newest first.
    fn list_published_with_tag(&self, tag_name: &str) -> RepoResult<Vec<Entry>>;
    fn get_entry(&self, id: EntryId) -> RepoResult<Entry>;
    fn entry_exists(&self, id: EntryId) -> RepoResult<bool>;
    fn create_entry(&self, fields: &EntryFields) -> RepoResult<EntryId>;
    fn update_entry(&self, id: EntryId, fields: &EntryFields) -> RepoResult<()>;
    fn delete_entry(&self, id: EntryId) -> RepoResult<()>;
}

/// SQLite-backed entry repository.
pub struct SqliteEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Constructs a repository after checking the schema is in place.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables_ready(conn, &["entries", "entry_tag"])?;
        Ok(Self::new(conn))
    }

    fn query_entries<P: Params>(&self, sql: &str, params: P) -> RepoResult<Vec<Entry>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn query_summaries(&self, status: EntryStatus) -> RepoResult<Vec<EntrySummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title
             FROM entries
             WHERE status = ?1
             ORDER BY id DESC;",
        )?;
        let mut rows = stmt.query([status.as_str()])?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            summaries.push(EntrySummary {
                id: row.get("id")?,
                title: row.get("title")?,
            });
        }
        Ok(summaries)
    }
}

impl EntryRepository for SqliteEntryRepository<'_> {
    fn list_published(&self) -> RepoResult<Vec<Entry>> {
        self.query_entries(
            &format!("{ENTRY_SELECT_SQL} WHERE e.status = ?1 ORDER BY e.id DESC;"),
            [EntryStatus::Published.as_str()],
        )
    }

    fn list_drafts(&self) -> RepoResult<Vec<EntrySummary>> {
        self.query_summaries(EntryStatus::Draft)
    }

    fn list_posts(&self) -> RepoResult<Vec<EntrySummary>> {
        self.query_summaries(EntryStatus::Published)
    }

    fn list_published_in_category(&self, category_id: CategoryId) -> RepoResult<Vec<Entry>> {
        self.query_entries(
            &format!(
                "{ENTRY_SELECT_SQL}
                 WHERE e.status = ?1
                   AND e.category_id = ?2
                 ORDER BY e.id DESC;"
            ),
            params![EntryStatus::Published.as_str(), category_id],
        )
    }

    fn list_published_with_tag(&self, tag_name: &str) -> RepoResult<Vec<Entry>> {
        self.query_entries(
            &format!(
                "{ENTRY_SELECT_SQL}
                 INNER JOIN entry_tag et ON et.entry_id = e.id
                 INNER JOIN tags t ON t.id = et.tag_id
                 WHERE e.status = ?1
                   AND t.name = ?2
                 ORDER BY e.id DESC;"
            ),
            params![EntryStatus::Published.as_str(), tag_name],
        )
    }

    fn get_entry(&self, id: EntryId) -> RepoResult<Entry> {
        self.query_entries(&format!("{ENTRY_SELECT_SQL} WHERE e.id = ?1;"), [id])?
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::not_found(RecordKind::Entry, id))
    }

    fn entry_exists(&self, id: EntryId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM entries WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn create_entry(&self, fields: &EntryFields) -> RepoResult<EntryId> {
        fields.validate()?;

        self.conn.execute(
            "INSERT INTO entries (title, text, status, category_id)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                fields.title.as_str(),
                fields.body.as_str(),
                fields.status.as_str(),
                fields.category_id,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(
            "event=entry_create module=repo status=ok entry_id={} entry_status={}",
            id, fields.status
        );
        Ok(id)
    }

    fn update_entry(&self, id: EntryId, fields: &EntryFields) -> RepoResult<()> {
        fields.validate()?;

        let changed = self.conn.execute(
            "UPDATE entries
             SET
                title = ?1,
                text = ?2,
                status = ?3,
                category_id = ?4
             WHERE id = ?5;",
            params![
                fields.title.as_str(),
                fields.body.as_str(),
                fields.status.as_str(),
                fields.category_id,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found(RecordKind::Entry, id));
        }

        Ok(())
    }

    fn delete_entry(&self, id: EntryId) -> RepoResult<()> {
        with_savepoint(self.conn, "delete_entry", |conn| -> RepoResult<()> {
            conn.execute("DELETE FROM entry_tag WHERE entry_id = ?1;", [id])?;
            let removed = conn.execute("DELETE FROM entries WHERE id = ?1;", [id])?;
            debug!(
                "event=entry_delete module=repo status=ok entry_id={} removed={}",
                id, removed
            );
            Ok(())
        })
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<Entry> {
    let status_text: String = row.get("status")?;
    let status = EntryStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid entry status `{status_text}` in entries.status"))
    })?;

    Ok(Entry {
        id: row.get("id")?,
        title: row.get("title")?,
        body: row.get("text")?,
        status,
        category_id: row.get("category_id")?,
    })
}
