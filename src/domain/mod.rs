//! Core domain models for outdater
//!
//! This module contains the fundamental types used throughout the application:
//! - Language types for supported ecosystems
//! - Version specification types for preserving range prefixes on upgrade
//! - Updates and rendered update suggestions
//! - Invocation context and the deterministic reconciliation target

mod context;
mod language;
mod update;
mod version_spec;

pub use context::{
    branch_name, commit_title, pull_request_title, InvocationContext, InvocationEvent,
    ReconciliationTarget, COMMIT_MESSAGE,
};
pub use language::Language;
pub use update::{Update, UpdateSuggestion};
pub use version_spec::{VersionSpec, VersionSpecKind};
