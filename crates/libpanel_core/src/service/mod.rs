//! Core use-case services.
//!
//! # Responsibility
//! - Wrap repository calls into the entry points API callers hold.
//! - Keep callers decoupled from storage details.

pub mod library_panel_service;
