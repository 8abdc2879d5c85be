//! Core content management for a single-author blog.
//!
//! Entries with a draft/published lifecycle, categories, tags and the
//! session-gated admin workflow. Rendering, routing and the session transport
//! are left to the embedding server.

pub mod auth;
pub mod config;
pub mod context;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use auth::{
    hash_password, login, logout, require_admin, verify_password, AdminCredentials, AuthError,
    Authorized, HashParams, LoginOutcome, MemorySession, SessionStore, LOGGED_IN_KEY,
};
pub use config::{BlogConfig, ConfigError, SETTINGS_ENV_VAR};
pub use context::RequestContext;
pub use db::{init_schema, open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::category::{Category, CategoryId, UNCATEGORIZED_ID};
pub use model::entry::{Entry, EntryFields, EntryId, EntryStatus, EntrySummary};
pub use model::tag::{parse_tag_field, Tag, TagId};
pub use repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
pub use repo::entry_repo::{EntryRepository, SqliteEntryRepository};
pub use repo::tag_repo::{SqliteTagRepository, TagRepository};
pub use repo::{RecordKind, RepoError, RepoResult};
pub use service::admin_service::{AdminError, AdminService, EntryEditView, SaveOutcome};
pub use service::blog_service::{BlogService, CategoryPage, EntryView, TagPage};
pub use service::tag_reconcile::TagDelta;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
