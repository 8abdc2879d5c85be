//! Public read use-cases for anonymous visitors.
//!
//! # Invariants
//! - Only published entries are ever returned.
//! - No method writes to the store.

use crate::model::category::{Category, CategoryId};
use crate::model::entry::{Entry, EntryId, EntryStatus};
use crate::model::tag::Tag;
use crate::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use crate::repo::entry_repo::{EntryRepository, SqliteEntryRepository};
use crate::repo::tag_repo::{SqliteTagRepository, TagRepository};
use crate::repo::{RecordKind, RepoError, RepoResult};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeSet;

/// Data bag for the single-entry page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryView {
    pub entry: Entry,
    pub category: Category,
    pub tags: BTreeSet<String>,
}

/// Data bag for a category listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryPage {
    pub category: Category,
    pub entries: Vec<Entry>,
}

/// Data bag for a tag listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagPage {
    pub name: String,
    pub entries: Vec<Entry>,
}

/// Read-only facade over the content repositories.
pub struct BlogService<E, C, T> {
    entries: E,
    categories: C,
    tags: T,
}

impl<'conn>
    BlogService<
        SqliteEntryRepository<'conn>,
        SqliteCategoryRepository<'conn>,
        SqliteTagRepository<'conn>,
    >
{
    /// Builds the service over one SQLite connection.
    pub fn sqlite(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(
            SqliteEntryRepository::try_new(conn)?,
            SqliteCategoryRepository::try_new(conn)?,
            SqliteTagRepository::try_new(conn)?,
        ))
    }
}

impl<E, C, T> BlogService<E, C, T>
where
    E: EntryRepository,
    C: CategoryRepository,
    T: TagRepository,
{
    pub fn new(entries: E, categories: C, tags: T) -> Self {
        Self {
            entries,
            categories,
            tags,
        }
    }

    /// Public index, newest first. Empty when nothing is published yet.
    pub fn list_published(&self) -> RepoResult<Vec<Entry>> {
        self.entries.list_published()
    }

    /// One published entry with its category and tags. Drafts read as missing.
    pub fn view_entry(&self, id: EntryId) -> RepoResult<EntryView> {
        let entry = self.entries.get_entry(id)?;
        if entry.status != EntryStatus::Published {
            return Err(RepoError::not_found(RecordKind::Entry, id));
        }
        let category = self.categories.get_category(entry.category_id)?;
        let tags = self.tags.tags_of_entry(id)?;
        Ok(EntryView {
            entry,
            category,
            tags,
        })
    }

    pub fn list_categories(&self) -> RepoResult<Vec<Category>> {
        self.categories.list_categories()
    }

    pub fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        self.tags.list_tags()
    }

    pub fn category_page(&self, id: CategoryId) -> RepoResult<CategoryPage> {
        let category = self.categories.get_category(id)?;
        let entries = self.entries.list_published_in_category(id)?;
        Ok(CategoryPage { category, entries })
    }

    /// Published entries carrying `name`. An unknown tag yields an empty page.
    pub fn tag_page(&self, name: &str) -> RepoResult<TagPage> {
        let name = name.trim();
        Ok(TagPage {
            name: name.to_string(),
            entries: self.entries.list_published_with_tag(name)?,
        })
    }
}
