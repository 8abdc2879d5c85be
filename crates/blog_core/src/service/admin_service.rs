//! Admin workflow controller.
//!
//! # Responsibility
//! - Gate every admin operation behind the session check.
//! - Save an entry together with its submitted tag set in one transaction.
//! - Validate admin input before it reaches the repositories.
//!
//! # Invariants
//! - An unauthorized caller causes zero store mutations.
//! - Entry fields and tag reconciliation commit together or not at all.
//! - Only transient lock contention is retried, a bounded number of times.

use crate::auth::{AuthError, SessionStore};
use crate::context::RequestContext;
use crate::model::category::{Category, CategoryId};
use crate::model::entry::{Entry, EntryFields, EntryId, EntryStatus, EntrySummary, EntryValidationError};
use crate::model::tag::{format_tag_field, parse_tag_field, TagId};
use crate::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use crate::repo::entry_repo::{EntryRepository, SqliteEntryRepository};
use crate::repo::tag_repo::{SqliteTagRepository, TagRepository};
use crate::repo::{RecordKind, RepoError};
use crate::service::tag_reconcile::{reconcile_entry_tags, TagDelta};
use log::{info, warn};
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Attempts made for a transactional save before surfacing contention.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(25);

/// Workflow-level error taxonomy surfaced to the presentation layer.
#[derive(Debug)]
pub enum AdminError {
    /// Session lacks the logged-in flag.
    Unauthorized,
    /// Malformed admin input.
    Validation(String),
    /// Operation targets a nonexistent record.
    NotFound { kind: RecordKind, id: i64 },
    /// Business-rule refusal.
    Rejected(String),
    /// Persistence failure; any open transaction was rolled back.
    Store(RepoError),
}

impl AdminError {
    fn is_transient(&self) -> bool {
        matches!(self, Self::Store(err) if err.is_transient())
    }
}

impl Display for AdminError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "admin login required"),
            Self::Validation(message) => write!(f, "invalid input: {message}"),
            Self::NotFound { kind, id } => write!(f, "{} not found: {id}", kind.as_str()),
            Self::Rejected(reason) => write!(f, "rejected: {reason}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AdminError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AuthError> for AdminError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::Unauthorized => Self::Unauthorized,
        }
    }
}

impl From<EntryValidationError> for AdminError {
    fn from(value: EntryValidationError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<RepoError> for AdminError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err.to_string()),
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            RepoError::Rejected(reason) => Self::Rejected(reason),
            other => Self::Store(other),
        }
    }
}

impl From<rusqlite::Error> for AdminError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(RepoError::from(value))
    }
}

/// Result of a committed entry save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub entry_id: EntryId,
    /// Submitted target status; callers route to the draft or post list.
    pub status: EntryStatus,
    pub tags: TagDelta,
}

/// Data bag for the entry editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryEditView {
    pub entry: Entry,
    pub tags: BTreeSet<String>,
    /// Current tags rendered in the comma-separated editor format.
    pub tag_field: String,
    pub categories: Vec<Category>,
}

/// Admin use-case facade.
#[derive(Debug, Clone)]
pub struct AdminService {
    max_attempts: u32,
}

impl Default for AdminService {
    fn default() -> Self {
        Self::new()
    }
}

impl AdminService {
    pub fn new() -> Self {
        Self::with_max_attempts(DEFAULT_MAX_ATTEMPTS)
    }

    /// Overrides the retry bound for transactional saves; at least one attempt
    /// is always made.
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn list_drafts<S: SessionStore + ?Sized>(
        &self,
        ctx: &RequestContext<'_, S>,
    ) -> Result<Vec<EntrySummary>, AdminError> {
        ctx.require_admin()?;
        Ok(SqliteEntryRepository::new(ctx.conn()).list_drafts()?)
    }

    pub fn list_posts<S: SessionStore + ?Sized>(
        &self,
        ctx: &RequestContext<'_, S>,
    ) -> Result<Vec<EntrySummary>, AdminError> {
        ctx.require_admin()?;
        Ok(SqliteEntryRepository::new(ctx.conn()).list_posts()?)
    }

    /// Loads one entry of any status with its tags and the category choices.
    pub fn entry_for_edit<S: SessionStore + ?Sized>(
        &self,
        ctx: &RequestContext<'_, S>,
        id: EntryId,
    ) -> Result<EntryEditView, AdminError> {
        ctx.require_admin()?;
        let conn = ctx.conn();
        let entry = SqliteEntryRepository::new(conn).get_entry(id)?;
        let tags = SqliteTagRepository::new(conn).tags_of_entry(id)?;
        let categories = SqliteCategoryRepository::new(conn).list_categories()?;
        Ok(EntryEditView {
            entry,
            tag_field: format_tag_field(&tags),
            tags,
            categories,
        })
    }

    pub fn create_entry<S: SessionStore + ?Sized>(
        &self,
        ctx: &mut RequestContext<'_, S>,
        fields: &EntryFields,
        tag_field: &str,
    ) -> Result<SaveOutcome, AdminError> {
        self.save_entry(ctx, None, fields, tag_field)
    }

    pub fn update_entry<S: SessionStore + ?Sized>(
        &self,
        ctx: &mut RequestContext<'_, S>,
        id: EntryId,
        fields: &EntryFields,
        tag_field: &str,
    ) -> Result<SaveOutcome, AdminError> {
        self.save_entry(ctx, Some(id), fields, tag_field)
    }

    /// Creates (`id = None`) or overwrites an entry and reconciles its tags
    /// against the comma-separated `tag_field`, all in one transaction.
    pub fn save_entry<S: SessionStore + ?Sized>(
        &self,
        ctx: &mut RequestContext<'_, S>,
        id: Option<EntryId>,
        fields: &EntryFields,
        tag_field: &str,
    ) -> Result<SaveOutcome, AdminError> {
        ctx.require_admin()?;
        fields.validate()?;
        let submitted = parse_tag_field(tag_field);

        let outcome = self.in_transaction(ctx.conn_mut(), "entry_save", |conn| {
            ensure_category_exists(conn, fields.category_id)?;
            let entries = SqliteEntryRepository::new(conn);
            let entry_id = match id {
                Some(id) => {
                    entries.update_entry(id, fields)?;
                    id
                }
                None => entries.create_entry(fields)?,
            };
            let tags = reconcile_entry_tags(&SqliteTagRepository::new(conn), entry_id, &submitted)?;
            Ok(SaveOutcome {
                entry_id,
                status: fields.status,
                tags,
            })
        })?;

        info!(
            "event=entry_save module=service status=ok entry_id={} created={} entry_status={} tags_added={} tags_removed={}",
            outcome.entry_id,
            id.is_none(),
            outcome.status,
            outcome.tags.added.len(),
            outcome.tags.removed.len()
        );
        Ok(outcome)
    }

    /// Deletes an entry and its tag associations. Missing ids are not an error.
    pub fn delete_entry<S: SessionStore + ?Sized>(
        &self,
        ctx: &mut RequestContext<'_, S>,
        id: EntryId,
    ) -> Result<(), AdminError> {
        ctx.require_admin()?;
        SqliteEntryRepository::new(ctx.conn()).delete_entry(id)?;
        info!("event=entry_delete module=service status=ok entry_id={id}");
        Ok(())
    }

    pub fn list_categories<S: SessionStore + ?Sized>(
        &self,
        ctx: &RequestContext<'_, S>,
    ) -> Result<Vec<Category>, AdminError> {
        ctx.require_admin()?;
        Ok(SqliteCategoryRepository::new(ctx.conn()).list_categories()?)
    }

    pub fn create_category<S: SessionStore + ?Sized>(
        &self,
        ctx: &mut RequestContext<'_, S>,
        name: &str,
    ) -> Result<CategoryId, AdminError> {
        ctx.require_admin()?;
        let name = normalize_name("category", name)?;
        let id = SqliteCategoryRepository::new(ctx.conn()).create_category(&name)?;
        info!("event=category_create module=service status=ok category_id={id}");
        Ok(id)
    }

    pub fn rename_category<S: SessionStore + ?Sized>(
        &self,
        ctx: &mut RequestContext<'_, S>,
        id: CategoryId,
        name: &str,
    ) -> Result<(), AdminError> {
        ctx.require_admin()?;
        let name = normalize_name("category", name)?;
        SqliteCategoryRepository::new(ctx.conn()).update_category(id, &name)?;
        Ok(())
    }

    /// Deletes a category, moving its entries to the reserved category.
    /// Returns the number of entries moved.
    pub fn delete_category<S: SessionStore + ?Sized>(
        &self,
        ctx: &mut RequestContext<'_, S>,
        id: CategoryId,
    ) -> Result<usize, AdminError> {
        ctx.require_admin()?;
        Ok(SqliteCategoryRepository::new(ctx.conn()).delete_category(id)?)
    }

    pub fn create_tag<S: SessionStore + ?Sized>(
        &self,
        ctx: &mut RequestContext<'_, S>,
        name: &str,
    ) -> Result<(), AdminError> {
        ctx.require_admin()?;
        let name = normalize_name("tag", name)?;
        SqliteTagRepository::new(ctx.conn()).create_tag(&name)?;
        Ok(())
    }

    pub fn rename_tag<S: SessionStore + ?Sized>(
        &self,
        ctx: &mut RequestContext<'_, S>,
        id: TagId,
        name: &str,
    ) -> Result<(), AdminError> {
        ctx.require_admin()?;
        let name = normalize_name("tag", name)?;
        SqliteTagRepository::new(ctx.conn()).update_tag(id, &name)?;
        Ok(())
    }

    /// Deletes a tag and detaches it from every entry.
    pub fn delete_tag<S: SessionStore + ?Sized>(
        &self,
        ctx: &mut RequestContext<'_, S>,
        id: TagId,
    ) -> Result<(), AdminError> {
        ctx.require_admin()?;
        SqliteTagRepository::new(ctx.conn()).delete_tag(id)?;
        info!("event=tag_delete module=service status=ok tag_id={id}");
        Ok(())
    }

    fn in_transaction<T, F>(
        &self,
        conn: &mut Connection,
        operation: &'static str,
        mut work: F,
    ) -> Result<T, AdminError>
    where
        F: FnMut(&Connection) -> Result<T, AdminError>,
    {
        let mut attempt = 1;
        loop {
            match run_transaction(conn, &mut work) {
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    warn!(
                        "event=tx_retry module=service status=retry operation={} attempt={} error={}",
                        operation, attempt, err
                    );
                    std::thread::sleep(RETRY_BACKOFF * attempt);
                    attempt += 1;
                }
                Err(err) => {
                    warn!(
                        "event=tx_abort module=service status=error operation={} attempt={} error={}",
                        operation, attempt, err
                    );
                    return Err(err);
                }
                Ok(value) => return Ok(value),
            }
        }
    }
}

/// Runs `work` in an immediate transaction. Dropping the transaction on any
/// error path rolls it back.
fn run_transaction<T, F>(conn: &mut Connection, work: &mut F) -> Result<T, AdminError>
where
    F: FnMut(&Connection) -> Result<T, AdminError>,
{
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let value = work(&*tx)?;
    tx.commit()?;
    Ok(value)
}

fn ensure_category_exists(conn: &Connection, id: CategoryId) -> Result<(), AdminError> {
    match SqliteCategoryRepository::new(conn).get_category(id) {
        Ok(_) => Ok(()),
        Err(RepoError::NotFound { .. }) => {
            Err(AdminError::Validation(format!("unknown category id: {id}")))
        }
        Err(err) => Err(err.into()),
    }
}

fn normalize_name(kind: &str, name: &str) -> Result<String, AdminError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AdminError::Validation(format!("{kind} name must not be blank")));
    }
    Ok(trimmed.to_string())
}
