//! User roles and the authorization policy table.
//!
//! Role identity is a plain enum; what a role may do is a separate lookup
//! table. Handlers ask `role.grants(Permission::...)` instead of matching on
//! role variants directly.

use serde::{Deserialize, Serialize};

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular customer account.
    #[default]
    User,
    /// Store administrator.
    Admin,
    /// Full access including destructive user management.
    SuperAdmin,
}

/// An action gated by the authorization policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ManageCatalog,
    ManageCoupons,
    ManageOrders,
    ManageNotices,
    RespondInquiries,
    ListUsers,
    ManageUsers,
    DeleteUsers,
}

/// Policy table: which roles are granted each permission.
const POLICY: &[(Permission, &[Role])] = &[
    (Permission::ManageCatalog, &[Role::Admin, Role::SuperAdmin]),
    (Permission::ManageCoupons, &[Role::Admin, Role::SuperAdmin]),
    (Permission::ManageOrders, &[Role::Admin, Role::SuperAdmin]),
    (Permission::ManageNotices, &[Role::Admin, Role::SuperAdmin]),
    (
        Permission::RespondInquiries,
        &[Role::Admin, Role::SuperAdmin],
    ),
    (Permission::ListUsers, &[Role::Admin, Role::SuperAdmin]),
    (Permission::ManageUsers, &[Role::Admin, Role::SuperAdmin]),
    (Permission::DeleteUsers, &[Role::SuperAdmin]),
];

impl Role {
    /// Whether the policy table grants this role the given permission.
    #[must_use]
    pub fn grants(self, permission: Permission) -> bool {
        POLICY
            .iter()
            .find(|(p, _)| *p == permission)
            .is_some_and(|(_, roles)| roles.contains(&self))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
            Self::SuperAdmin => write!(f, "super_admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "super_admin" => Ok(Self::SuperAdmin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_grants() {
        assert!(Role::Admin.grants(Permission::ManageCatalog));
        assert!(Role::SuperAdmin.grants(Permission::ManageCatalog));
        assert!(!Role::User.grants(Permission::ManageCatalog));
    }

    #[test]
    fn test_delete_users_is_super_admin_only() {
        assert!(Role::SuperAdmin.grants(Permission::DeleteUsers));
        assert!(!Role::Admin.grants(Permission::DeleteUsers));
        assert!(!Role::User.grants(Permission::DeleteUsers));
    }

    #[test]
    fn test_role_str_roundtrip() {
        for role in [Role::User, Role::Admin, Role::SuperAdmin] {
            let parsed: Role = role.to_string().parse().expect("roundtrip");
            assert_eq!(parsed, role);
        }
        assert!("root".parse::<Role>().is_err());
    }
}
