//! Category repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide list/get/create/rename/delete over `categories`.
//! - Keep entry references valid when a category goes away.
//!
//! # Invariants
//! - The reserved category `UNCATEGORIZED_ID` is never deleted.
//! - Deleting a category reassigns its entries to `UNCATEGORIZED_ID` and
//!   removes the row as one atomic unit.

use crate::db::with_savepoint;
use crate::model::category::{Category, CategoryId, UNCATEGORIZED_ID};
use crate::repo::{ensure_tables_ready, RecordKind, RepoError, RepoResult};
use log::info;
use rusqlite::{params, Connection};

/// Repository interface for category operations.
pub trait CategoryRepository {
    /// All categories ordered by id.
    fn list_categories(&self) -> RepoResult<Vec<Category>>;
    fn get_category(&self, id: CategoryId) -> RepoResult<Category>;
    fn create_category(&self, name: &str) -> RepoResult<CategoryId>;
    fn update_category(&self, id: CategoryId, name: &str) -> RepoResult<()>;
    /// Deletes one category and returns how many entries were moved to the
    /// reserved category.
    fn delete_category(&self, id: CategoryId) -> RepoResult<usize>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Constructs a repository after checking the schema is in place.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables_ready(conn, &["categories", "entries"])?;
        Ok(Self::new(conn))
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM categories ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(Category {
                id: row.get("id")?,
                name: row.get("name")?,
            });
        }
        Ok(categories)
    }

    fn get_category(&self, id: CategoryId) -> RepoResult<Category> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM categories WHERE id = ?1;")?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Category {
                id: row.get("id")?,
                name: row.get("name")?,
            }),
            None => Err(RepoError::not_found(RecordKind::Category, id)),
        }
    }

    fn create_category(&self, name: &str) -> RepoResult<CategoryId> {
        self.conn
            .execute("INSERT INTO categories (name) VALUES (?1);", [name])?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_category(&self, id: CategoryId, name: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE categories SET name = ?1 WHERE id = ?2;",
            params![name, id],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(RecordKind::Category, id));
        }
        Ok(())
    }

    fn delete_category(&self, id: CategoryId) -> RepoResult<usize> {
        if id == UNCATEGORIZED_ID {
            return Err(RepoError::Rejected(format!(
                "category {UNCATEGORIZED_ID} is reserved and cannot be deleted"
            )));
        }

        with_savepoint(self.conn, "delete_category", |conn| -> RepoResult<usize> {
            let reassigned = conn.execute(
                "UPDATE entries SET category_id = ?1 WHERE category_id = ?2;",
                params![UNCATEGORIZED_ID, id],
            )?;
            let removed = conn.execute("DELETE FROM categories WHERE id = ?1;", [id])?;
            info!(
                "event=category_delete module=repo status=ok category_id={} removed={} reassigned={}",
                id, removed, reassigned
            );
            Ok(reassigned)
        })
    }
}
