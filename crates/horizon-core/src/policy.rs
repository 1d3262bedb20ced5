//! Authorization policy evaluator.
//!
//! A single pure function decides every access: `evaluate` takes the
//! caller's resolved role in the target workspace (or `None` when no
//! membership row exists) and the requested action, and returns a
//! [`Decision`]. Storage layers resolve the role; nothing here touches
//! ambient state, which keeps the policy testable in isolation.
//!
//! Denials carry the reason apart: a non-member must see "not found"
//! semantics (zero rows, rejected writes) rather than a permission error,
//! so workspace contents never leak by existence.

use crate::error::{Error, Result};
use crate::models::Role;

/// Requested class of access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// SELECT-class access to workspace-scoped rows.
    Read,
    /// Insert/update/delete of content rows (sources, signals, trends,
    /// megatrends, join rows, jobs).
    Write,
    /// Workspace settings and membership mutation.
    Manage,
}

impl Action {
    /// Minimum role that satisfies this action.
    pub fn min_role(self) -> Role {
        match self {
            Self::Read => Role::Viewer,
            Self::Write => Role::Member,
            Self::Manage => Role::Admin,
        }
    }
}

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Caller holds no membership row for the workspace. Must surface as
    /// absence, never as a permission error.
    DenyNotMember,
    /// Caller is a member but the role is below the action's minimum.
    DenyRole,
}

/// Evaluate an access request against the membership relation.
pub fn evaluate(role: Option<Role>, action: Action) -> Decision {
    match role {
        None => Decision::DenyNotMember,
        Some(r) if r.rank() >= action.min_role().rank() => Decision::Allow,
        Some(_) => Decision::DenyRole,
    }
}

/// Evaluate and convert denials into errors.
///
/// `DenyNotMember` maps to [`Error::NotFound`] so callers outside the
/// workspace cannot distinguish "exists but private" from "does not exist".
pub fn require(role: Option<Role>, action: Action) -> Result<()> {
    match evaluate(role, action) {
        Decision::Allow => Ok(()),
        Decision::DenyNotMember => Err(Error::NotFound("workspace".to_string())),
        Decision::DenyRole => Err(Error::Forbidden(format!(
            "requires {} role or above",
            action.min_role()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ROLES: [Role; 4] = [Role::Owner, Role::Admin, Role::Member, Role::Viewer];

    #[test]
    fn test_non_member_denied_everything() {
        for action in [Action::Read, Action::Write, Action::Manage] {
            assert_eq!(evaluate(None, action), Decision::DenyNotMember);
        }
    }

    #[test]
    fn test_any_member_can_read() {
        for role in ALL_ROLES {
            assert_eq!(evaluate(Some(role), Action::Read), Decision::Allow);
        }
    }

    #[test]
    fn test_viewer_cannot_write() {
        assert_eq!(evaluate(Some(Role::Viewer), Action::Write), Decision::DenyRole);
    }

    #[test]
    fn test_member_can_write_but_not_manage() {
        assert_eq!(evaluate(Some(Role::Member), Action::Write), Decision::Allow);
        assert_eq!(
            evaluate(Some(Role::Member), Action::Manage),
            Decision::DenyRole
        );
    }

    #[test]
    fn test_admin_and_owner_can_manage() {
        assert_eq!(evaluate(Some(Role::Admin), Action::Manage), Decision::Allow);
        assert_eq!(evaluate(Some(Role::Owner), Action::Manage), Decision::Allow);
    }

    #[test]
    fn test_full_truth_table() {
        // (role, action) -> allowed
        let cases = [
            (Role::Owner, Action::Read, true),
            (Role::Owner, Action::Write, true),
            (Role::Owner, Action::Manage, true),
            (Role::Admin, Action::Read, true),
            (Role::Admin, Action::Write, true),
            (Role::Admin, Action::Manage, true),
            (Role::Member, Action::Read, true),
            (Role::Member, Action::Write, true),
            (Role::Member, Action::Manage, false),
            (Role::Viewer, Action::Read, true),
            (Role::Viewer, Action::Write, false),
            (Role::Viewer, Action::Manage, false),
        ];
        for (role, action, allowed) in cases {
            let decision = evaluate(Some(role), action);
            assert_eq!(
                decision == Decision::Allow,
                allowed,
                "role={} action={:?}",
                role,
                action
            );
        }
    }

    #[test]
    fn test_require_maps_not_member_to_not_found() {
        let err = require(None, Action::Read).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_require_maps_role_denial_to_forbidden() {
        let err = require(Some(Role::Viewer), Action::Write).unwrap_err();
        match err {
            Error::Forbidden(msg) => assert!(msg.contains("member")),
            other => panic!("Expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn test_require_allows() {
        assert!(require(Some(Role::Member), Action::Write).is_ok());
    }
}
