//! Tenant scoping
//!
//! Every tenant-owned query takes a [`TenantScope`] parameter. The scope is
//! only constructed from an authenticated gym-manager principal, so handler
//! code cannot issue an unscoped tenant query by accident.

use uuid::Uuid;

/// The gym a request is allowed to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantScope {
    gym_id: Uuid,
}

impl TenantScope {
    /// Construct a scope from an authenticated gym-manager id. Callers
    /// outside the auth middleware should receive a scope, not build one.
    pub fn new(gym_id: Uuid) -> Self {
        Self { gym_id }
    }

    pub fn gym_id(&self) -> Uuid {
        self.gym_id
    }
}
