//! Row-level visibility for reports.
//!
//! Admins read every report; everyone else reads only the reports they own.
//! Writes are not role-gated: any authenticated principal may create a report,
//! and it is always attributed to that principal.

use crate::domain::{Principal, UserId};
use crate::services::auth_service::AuthError;

/// Anything with a single owning user.
pub trait Owned {
    fn owner_id(&self) -> UserId;
}

/// Which rows a principal may read, in a form a query can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportScope {
    All,
    OwnedBy(UserId),
}

impl ReportScope {
    #[must_use]
    pub fn for_principal(principal: &Principal) -> Self {
        if principal.is_admin() {
            Self::All
        } else {
            Self::OwnedBy(principal.id)
        }
    }

    #[must_use]
    pub fn permits(&self, owner: UserId) -> bool {
        match self {
            Self::All => true,
            Self::OwnedBy(id) => *id == owner,
        }
    }
}

/// Gate for admin-only operations such as user provisioning and metrics.
pub fn require_admin(principal: &Principal) -> Result<(), AuthError> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(AuthError::Forbidden("Admin privileges required".to_string()))
    }
}

/// Filters `reports` down to what `principal` may see.
///
/// Input order is preserved; nothing is re-sorted.
pub fn visible_reports<T, I>(principal: &Principal, reports: I) -> Vec<T>
where
    T: Owned,
    I: IntoIterator<Item = T>,
{
    let scope = ReportScope::for_principal(principal);
    reports
        .into_iter()
        .filter(|report| scope.permits(report.owner_id()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i32,
        owner: i32,
    }

    impl Owned for Row {
        fn owner_id(&self) -> UserId {
            UserId::new(self.owner)
        }
    }

    fn principal(id: i32, role: Role) -> Principal {
        Principal {
            id: UserId::new(id),
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            password_hash: String::new(),
            role,
            created_at: String::new(),
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: 1, owner: 1 },
            Row { id: 2, owner: 2 },
            Row { id: 3, owner: 1 },
        ]
    }

    #[test]
    fn test_staff_sees_only_own_reports() {
        let staff = principal(1, Role::Staff);
        let ids: Vec<i32> = visible_reports(&staff, rows()).iter().map(|r| r.id).collect();
        assert_eq!(ids, [1, 3]);
    }

    #[test]
    fn test_admin_sees_everything_in_input_order() {
        let admin = principal(1, Role::Admin);
        let mut input = rows();
        input.reverse();

        let visible = visible_reports(&admin, input.clone());
        assert_eq!(visible, input);
    }

    #[test]
    fn test_staff_without_reports_sees_nothing() {
        let staff = principal(9, Role::Staff);
        assert!(visible_reports(&staff, rows()).is_empty());
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&principal(1, Role::Admin)).is_ok());
        assert!(matches!(
            require_admin(&principal(2, Role::Staff)),
            Err(AuthError::Forbidden(_))
        ));
    }

    #[test]
    fn test_scope_for_principal() {
        assert_eq!(
            ReportScope::for_principal(&principal(4, Role::Admin)),
            ReportScope::All
        );
        assert_eq!(
            ReportScope::for_principal(&principal(4, Role::Staff)),
            ReportScope::OwnedBy(UserId::new(4))
        );
    }
}
