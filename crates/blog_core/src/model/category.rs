//! Category domain model.
//!
//! # Invariants
//! - Category `UNCATEGORIZED_ID` always exists and can never be deleted.
//! - Entries of a deleted category fall back to `UNCATEGORIZED_ID`.

use serde::{Deserialize, Serialize};

pub type CategoryId = i64;

/// Reserved default category id.
pub const UNCATEGORIZED_ID: CategoryId = 1;
/// Name given to the reserved category at seed time.
pub const UNCATEGORIZED_NAME: &str = "uncategorized";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    /// Returns whether this is the reserved default category.
    pub fn is_reserved(&self) -> bool {
        self.id == UNCATEGORIZED_ID
    }
}
