//! Library panel domain model.
//!
//! # Responsibility
//! - Define the data structures shared by repository and service layers.
//!
//! # Invariants
//! - Panels are always scoped to exactly one organization.
//! - Deletion is a hard delete; there are no tombstones.

pub mod library_panel;
