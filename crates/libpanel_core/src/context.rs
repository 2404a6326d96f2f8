//! Request context carried into every library panel call.
//!
//! # Responsibility
//! - Describe the authenticated caller (organization + user) explicitly.
//!
//! # Invariants
//! - Every repository/service operation is scoped to `org_id`.
//! - Audit fields (`created_by`, `updated_by`) are stamped from `user_id`.

use serde::{Deserialize, Serialize};

/// Tenant scoping identifier.
pub type OrgId = i64;

/// Authenticated user identifier.
pub type UserId = i64;

/// Identity of the signed-in caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignedInUser {
    pub org_id: OrgId,
    pub user_id: UserId,
}

impl SignedInUser {
    pub fn new(org_id: OrgId, user_id: UserId) -> Self {
        Self { org_id, user_id }
    }
}
