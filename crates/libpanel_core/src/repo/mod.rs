//! Repository layer contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the library panel data access contract.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `AlreadyExists`)
//!   in addition to store transport errors.

pub mod library_panel_repo;
