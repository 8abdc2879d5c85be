//! Tag repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide list/get/create/rename/delete over `tags`.
//! - Own the `entry_tag` association between entries and tags.
//!
//! # Invariants
//! - Tag names are unique; creating an existing name is a no-op.
//! - An (entry, tag) pair is stored at most once.
//! - Deleting a tag removes its associations with the row.

use crate::db::with_savepoint;
use crate::model::entry::EntryId;
use crate::model::tag::{Tag, TagId};
use crate::repo::{ensure_tables_ready, is_unique_violation, RecordKind, RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection};
use std::collections::BTreeSet;

/// Repository interface for tags and entry/tag associations.
pub trait TagRepository {
    /// All tags ordered by name.
    fn list_tags(&self) -> RepoResult<Vec<Tag>>;
    fn get_tag(&self, id: TagId) -> RepoResult<Tag>;
    /// Inserts a tag unless one with the same name exists.
    fn create_tag(&self, name: &str) -> RepoResult<()>;
    fn update_tag(&self, id: TagId, name: &str) -> RepoResult<()>;
    fn delete_tag(&self, id: TagId) -> RepoResult<()>;
    /// Names of the tags currently attached to one entry.
    fn tags_of_entry(&self, entry_id: EntryId) -> RepoResult<BTreeSet<String>>;
    /// Attaches a tag by name, creating the tag when absent. Both happen or
    /// neither does.
    fn add_entry_tag(&self, entry_id: EntryId, tag_name: &str) -> RepoResult<()>;
    /// Detaches a tag by name. No-op when not attached.
    fn remove_entry_tag(&self, entry_id: EntryId, tag_name: &str) -> RepoResult<()>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Constructs a repository after checking the schema is in place.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables_ready(conn, &["tags", "entry_tag"])?;
        Ok(Self::new(conn))
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM tags ORDER BY name ASC;")?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(Tag {
                id: row.get("id")?,
                name: row.get("name")?,
            });
        }
        Ok(tags)
    }

    fn get_tag(&self, id: TagId) -> RepoResult<Tag> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM tags WHERE id = ?1;")?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Tag {
                id: row.get("id")?,
                name: row.get("name")?,
            }),
            None => Err(RepoError::not_found(RecordKind::Tag, id)),
        }
    }

    fn create_tag(&self, name: &str) -> RepoResult<()> {
        self.conn
            .execute("INSERT OR IGNORE INTO tags (name) VALUES (?1);", [name])?;
        Ok(())
    }

    fn update_tag(&self, id: TagId, name: &str) -> RepoResult<()> {
        let changed = match self
            .conn
            .execute("UPDATE tags SET name = ?1 WHERE id = ?2;", params![name, id])
        {
            Ok(changed) => changed,
            Err(err) if is_unique_violation(&err) => {
                return Err(RepoError::Rejected(format!(
                    "tag name `{name}` is already in use"
                )));
            }
            Err(err) => return Err(err.into()),
        };
        if changed == 0 {
            return Err(RepoError::not_found(RecordKind::Tag, id));
        }
        Ok(())
    }

    fn delete_tag(&self, id: TagId) -> RepoResult<()> {
        with_savepoint(self.conn, "delete_tag", |conn| -> RepoResult<()> {
            let detached = conn.execute("DELETE FROM entry_tag WHERE tag_id = ?1;", [id])?;
            conn.execute("DELETE FROM tags WHERE id = ?1;", [id])?;
            debug!(
                "event=tag_delete module=repo status=ok tag_id={} detached={}",
                id, detached
            );
            Ok(())
        })
    }

    fn tags_of_entry(&self, entry_id: EntryId) -> RepoResult<BTreeSet<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.name
             FROM entry_tag et
             INNER JOIN tags t ON t.id = et.tag_id
             WHERE et.entry_id = ?1;",
        )?;
        let mut rows = stmt.query([entry_id])?;
        let mut names = BTreeSet::new();
        while let Some(row) = rows.next()? {
            names.insert(row.get::<_, String>(0)?);
        }
        Ok(names)
    }

    fn add_entry_tag(&self, entry_id: EntryId, tag_name: &str) -> RepoResult<()> {
        with_savepoint(self.conn, "add_entry_tag", |conn| -> RepoResult<()> {
            conn.execute("INSERT OR IGNORE INTO tags (name) VALUES (?1);", [tag_name])?;
            conn.execute(
                "INSERT OR IGNORE INTO entry_tag (entry_id, tag_id)
                 SELECT ?1, id
                 FROM tags
                 WHERE name = ?2;",
                params![entry_id, tag_name],
            )?;
            Ok(())
        })
    }

    fn remove_entry_tag(&self, entry_id: EntryId, tag_name: &str) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM entry_tag
             WHERE entry_id = ?1
               AND tag_id IN (SELECT id FROM tags WHERE name = ?2);",
            params![entry_id, tag_name],
        )?;
        Ok(())
    }
}
