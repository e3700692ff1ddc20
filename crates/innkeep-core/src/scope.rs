//! Establishment scope resolution and access validation.
//!
//! Every read and write in the booking core is gated by an
//! [`AccessScope`] derived once per request from the acting principal's
//! role and home establishment. Privilege logic lives here and nowhere
//! else — call sites never branch on role strings.

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::{InnkeepError, InnkeepResult};

/// Staff roles recognized by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Root,
    SuperAdmin,
    Manager,
    Staff,
}

impl Role {
    /// Privileged roles see every establishment.
    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Root | Role::SuperAdmin)
    }

    /// Read-only roles can never modify resources, even within their
    /// own establishment.
    pub fn is_read_only(self) -> bool {
        matches!(self, Role::Staff)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Root => "root",
            Role::SuperAdmin => "super_admin",
            Role::Manager => "manager",
            Role::Staff => "staff",
        }
    }
}

/// Request-scoped access boundary: every establishment, or exactly one.
///
/// Not persisted; derived at the start of each operation via
/// [`resolve_scope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessScope {
    Unrestricted,
    RestrictedTo(Uuid),
}

/// Derive the access scope for a principal.
///
/// Privileged roles always yield [`AccessScope::Unrestricted`],
/// regardless of any home establishment on the account. Restricted
/// roles are confined to their home establishment; a restricted role
/// without one is a configuration defect
/// ([`InnkeepError::ScopeConfiguration`]), not an access denial.
pub fn resolve_scope(role: Role, home_establishment: Option<Uuid>) -> InnkeepResult<AccessScope> {
    if role.is_privileged() {
        return Ok(AccessScope::Unrestricted);
    }
    match home_establishment {
        Some(id) => Ok(AccessScope::RestrictedTo(id)),
        None => {
            warn!(
                role = role.as_str(),
                "restricted role has no home establishment"
            );
            Err(InnkeepError::ScopeConfiguration {
                role: role.as_str().into(),
            })
        }
    }
}

impl AccessScope {
    /// Whether this scope may read a resource owned by
    /// `resource_establishment`.
    pub fn can_access(&self, resource_establishment: Uuid) -> bool {
        match self {
            AccessScope::Unrestricted => true,
            AccessScope::RestrictedTo(own) => *own == resource_establishment,
        }
    }

    /// Whether this scope may modify a resource owned by
    /// `resource_establishment`.
    ///
    /// Modification requires both an establishment match and a role
    /// with write capability — read-only roles fail even inside their
    /// own establishment.
    pub fn can_modify(&self, resource_establishment: Uuid, role: Role) -> bool {
        !role.is_read_only() && self.can_access(resource_establishment)
    }

    /// Fail with [`InnkeepError::AccessDenied`] unless this scope may
    /// read the resource.
    ///
    /// Both establishment ids are logged for audit; the returned error
    /// carries neither.
    pub fn enforce(&self, resource_establishment: Uuid, resource_type: &str) -> InnkeepResult<()> {
        if self.can_access(resource_establishment) {
            return Ok(());
        }
        let caller = match self {
            AccessScope::RestrictedTo(id) => Some(*id),
            AccessScope::Unrestricted => None,
        };
        warn!(
            resource_type,
            resource_establishment = %resource_establishment,
            caller_establishment = ?caller,
            "access denied"
        );
        Err(InnkeepError::AccessDenied)
    }

    /// Constrain a list query's establishment filter to this scope.
    ///
    /// Restricted scopes inject (or overwrite) the establishment
    /// constraint; unrestricted scopes leave the filter untouched.
    /// Must run before the query executes — never as a post-filter.
    pub fn apply_filter(&self, establishment_filter: &mut Option<Uuid>) {
        if let AccessScope::RestrictedTo(own) = self {
            *establishment_filter = Some(*own);
        }
    }
}
