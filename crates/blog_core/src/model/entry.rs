//! Entry domain model.
//!
//! # Responsibility
//! - Define the blog post record and its draft/published lifecycle.
//! - Validate admin-submitted entry fields before persistence.
//!
//! # Invariants
//! - `id` is assigned by the store and never changes.
//! - `status` only moves by an explicit submit carrying the target status.

use crate::model::category::{CategoryId, UNCATEGORIZED_ID};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EntryId = i64;

/// Publication state of an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Not publicly visible. Initial state.
    #[default]
    Draft,
    /// Listed on the public index.
    Published,
}

impl EntryStatus {
    /// Stable value stored in `entries.status`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }

    /// Parses a stored status value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            _ => None,
        }
    }

    /// Maps the submit action of the editor form: publishing when the
    /// publish control was used, drafting otherwise.
    pub fn from_publish_flag(publish: bool) -> Self {
        if publish {
            Self::Published
        } else {
            Self::Draft
        }
    }
}

impl Display for EntryStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full entry record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub title: String,
    /// Serialized as `text` to match the stored column.
    #[serde(rename = "text")]
    pub body: String,
    pub status: EntryStatus,
    pub category_id: CategoryId,
}

/// Id/title pair used by admin draft and post listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySummary {
    pub id: EntryId,
    pub title: String,
}

/// Mutable entry fields as submitted by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFields {
    pub title: String,
    pub body: String,
    pub status: EntryStatus,
    pub category_id: CategoryId,
}

impl EntryFields {
    /// Creates fields filed under the reserved default category.
    pub fn new(title: impl Into<String>, body: impl Into<String>, status: EntryStatus) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            status,
            category_id: UNCATEGORIZED_ID,
        }
    }

    /// Sets the category reference.
    pub fn in_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = category_id;
        self
    }

    /// Checks field-level rules that do not need the store.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if self.title.trim().is_empty() {
            return Err(EntryValidationError::BlankTitle);
        }
        if self.category_id <= 0 {
            return Err(EntryValidationError::InvalidCategoryId(self.category_id));
        }
        Ok(())
    }
}

/// Field-level rejection for submitted entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    BlankTitle,
    InvalidCategoryId(CategoryId),
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "entry title must not be blank"),
            Self::InvalidCategoryId(id) => write!(f, "invalid category id: {id}"),
        }
    }
}

impl Error for EntryValidationError {}
