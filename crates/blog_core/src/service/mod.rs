//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Own transaction boundaries for multi-step admin saves.
//! - Keep presentation layers decoupled from storage details.

pub mod admin_service;
pub mod blog_service;
pub mod tag_reconcile;
