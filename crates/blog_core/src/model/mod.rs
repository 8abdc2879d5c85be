//! Blog domain model.
//!
//! # Responsibility
//! - Define the typed records produced by repository reads.
//! - Define validated inputs accepted by admin write paths.
//!
//! # Invariants
//! - Every record is identified by a store-assigned integer id.
//! - Category `1` is the reserved `uncategorized` sentinel.

pub mod category;
pub mod entry;
pub mod tag;
