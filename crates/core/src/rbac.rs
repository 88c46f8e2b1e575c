//! Roles, route access rules and the page-guard decision.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::UserId;

//
// ─── ROLES ─────────────────────────────────────────────────────────────────────
//

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Guest,
    Student,
    #[serde(alias = "parent")]
    Guardian,
    Teacher,
    Admin,
    Superadmin,
}

/// Permission groups guarding specific route prefixes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    Superadmin,
    Admin,
    Teacher,
    Student,
    Guardian,
}

const PROTECTED_ROUTE_PATTERNS: [(Permission, &[&str]); 5] = [
    (
        Permission::Superadmin,
        &["/admin/roles", "/admin/users/assign-roles", "/admin/system-config"],
    ),
    (
        Permission::Admin,
        &["/admin/users", "/admin/classes", "/admin/reports", "/dashboard/admin/lessons"],
    ),
    (
        Permission::Teacher,
        &["/admin/lessons", "/teacher/create", "/teacher/evaluate", "/dashboard/lessons"],
    ),
    (Permission::Student, &["/dashboard/exercises", "/dashboard/progress"]),
    (Permission::Guardian, &["/guardian/children", "/guardian/reports"]),
];

/// Routes reachable without a session. `/` matches exactly, the rest by prefix.
pub const PUBLIC_ROUTES: &[&str] = &[
    "/",
    "/about",
    "/contact",
    "/privacy",
    "/terms",
    "/auth/login",
    "/auth/register",
    "/auth/forgot-password",
    "/auth/reset-password",
    "/auth/verify-email",
    "/auth/create-password",
    "/auth/set-role",
    "/auth/role",
];

/// Routes an authenticated user is bounced away from.
pub const AUTH_ROUTES: &[&str] = &[
    "/auth/login",
    "/auth/register",
    "/auth/verify-email",
    "/auth/forgot-password",
    "/auth/reset-password",
    "/auth/create-password",
];

impl UserRole {
    pub const ALL: [Self; 6] = [
        Self::Guest,
        Self::Student,
        Self::Guardian,
        Self::Teacher,
        Self::Admin,
        Self::Superadmin,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Student => "student",
            Self::Guardian => "guardian",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
            Self::Superadmin => "superadmin",
        }
    }

    #[must_use]
    pub fn home_route(self) -> &'static str {
        match self {
            Self::Guest => "/auth/set-role",
            Self::Student | Self::Guardian => "/dashboard",
            Self::Teacher => "/dashboard/teacher/lessons",
            Self::Admin => "/dashboard/admin/charts",
            Self::Superadmin => "/dashboard/superadmin",
        }
    }

    #[must_use]
    pub fn level(self) -> u8 {
        match self {
            Self::Guest => 0,
            Self::Student | Self::Guardian => 1,
            Self::Teacher => 2,
            Self::Admin => 3,
            Self::Superadmin => 4,
        }
    }

    #[must_use]
    pub fn requires_onboarding(self) -> bool {
        self == Self::Guest
    }

    #[must_use]
    pub fn allowed_routes(self) -> &'static [&'static str] {
        match self {
            Self::Guest => &[
                "/auth/login",
                "/auth/register",
                "/auth/set-role",
                "/onboarding",
                "/auth",
                "/auth/role",
                "/role",
            ],
            Self::Student => &[
                "/dashboard",
                "/dashboard/settings",
                "/dashboard/lessons",
                "/dashboard/quizzes",
                "/dashboard/past-questions",
                "/dashboard/records",
                "/lessons",
                "/exercises",
                "/profile",
            ],
            Self::Guardian => &[
                "/dashboard",
                "/dashboard/settings",
                "/dashboard/records",
                "/progress",
                "/profile",
                "/guardian-tools",
            ],
            Self::Teacher => &[
                "/dashboard/teacher",
                "/dashboard",
                "/teacher",
                "/lessons",
                "/uploads",
                "/profile",
            ],
            Self::Admin => &[
                "/dashboard/admin",
                "/dashboard",
                "/dashboard/settings",
                "/admin",
                "/users",
                "/reports",
                "/lessons",
                "/profile",
            ],
            Self::Superadmin => &[
                "/dashboard/superadmin",
                "/dashboard",
                "/dashboard/settings",
                "/superadmin",
                "/users",
                "/lessons",
                "/uploads",
                "/reports",
                "/settings",
                "/profile",
            ],
        }
    }

    #[must_use]
    pub fn restricted_routes(self) -> &'static [&'static str] {
        match self {
            Self::Guest => &["/dashboard", "/superadmin", "/admin", "/teacher"],
            Self::Student | Self::Guardian => &["/superadmin", "/admin", "/teacher", "/onboarding"],
            Self::Teacher => &["/superadmin", "/admin", "/onboarding"],
            Self::Admin => &["/superadmin", "/teacher", "/onboarding"],
            Self::Superadmin => &[],
        }
    }

    #[must_use]
    pub fn has_permission(self, permission: Permission) -> bool {
        let level = self.level();
        match permission {
            Permission::Superadmin => level >= Self::Superadmin.level(),
            Permission::Admin => level >= Self::Admin.level(),
            Permission::Teacher => level >= Self::Teacher.level(),
            Permission::Student => self == Self::Student || level >= Self::Teacher.level(),
            Permission::Guardian => self == Self::Guardian || level >= Self::Admin.level(),
        }
    }

    /// Restricted prefixes deny first, then allowed prefixes grant, then the
    /// protected patterns decide by permission. Anything else is denied.
    #[must_use]
    pub fn can_access_route(self, route: &str) -> bool {
        if self == Self::Superadmin {
            return true;
        }
        if self.restricted_routes().iter().any(|r| route.starts_with(r)) {
            return false;
        }
        if self.allowed_routes().iter().any(|r| route.starts_with(r)) {
            return true;
        }
        PROTECTED_ROUTE_PATTERNS
            .iter()
            .find(|(_, patterns)| patterns.iter().any(|p| route.starts_with(p)))
            .is_some_and(|(permission, _)| self.has_permission(*permission))
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "guest" => Ok(Self::Guest),
            "student" => Ok(Self::Student),
            "guardian" | "parent" => Ok(Self::Guardian),
            "teacher" => Ok(Self::Teacher),
            "admin" => Ok(Self::Admin),
            "superadmin" => Ok(Self::Superadmin),
            _ => Err(Error::InvalidRole(s.to_string())),
        }
    }
}

//
// ─── AUTHENTICATED USER ────────────────────────────────────────────────────────
//

/// The user record carried in the `auth_user` cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: Vec<UserRole>,
}

impl AuthUser {
    /// The first listed role; users without one are treated as guests.
    #[must_use]
    pub fn primary_role(&self) -> UserRole {
        self.role.first().copied().unwrap_or(UserRole::Guest)
    }
}

//
// ─── PAGE GUARD ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Public route, no session needed.
    Public,
    /// Authenticated and permitted.
    Allow { role: UserRole, user_id: UserId },
    RedirectToLogin { callback: String },
    /// Authenticated user on a login/register page.
    RedirectHome { home: &'static str },
    RedirectOnboarding,
    Denied { role: UserRole, home: &'static str },
}

#[must_use]
pub fn is_public_route(path: &str) -> bool {
    PUBLIC_ROUTES
        .iter()
        .any(|r| if *r == "/" { path == "/" } else { path.starts_with(r) })
}

#[must_use]
pub fn is_auth_route(path: &str) -> bool {
    AUTH_ROUTES.iter().any(|r| path.starts_with(r))
}

/// Decide what the page guard does with `path` for an optional session user.
#[must_use]
pub fn route_decision(path: &str, user: Option<&AuthUser>) -> RouteDecision {
    let Some(user) = user else {
        if is_public_route(path) {
            return RouteDecision::Public;
        }
        return RouteDecision::RedirectToLogin {
            callback: path.to_string(),
        };
    };
    let role = user.primary_role();

    if is_auth_route(path) {
        return RouteDecision::RedirectHome {
            home: role.home_route(),
        };
    }
    if is_public_route(path) {
        return RouteDecision::Public;
    }
    if role == UserRole::Guest {
        if path.starts_with("/onboarding") || path.starts_with("/guest") {
            return RouteDecision::Allow {
                role,
                user_id: user.id,
            };
        }
        return RouteDecision::RedirectOnboarding;
    }
    if !role.can_access_route(path) {
        return RouteDecision::Denied {
            role,
            home: role.home_route(),
        };
    }
    RouteDecision::Allow {
        role,
        user_id: user.id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> AuthUser {
        AuthUser {
            id: UserId::new(42),
            email: "a@b.c".into(),
            name: None,
            role: vec![role],
        }
    }

    #[test]
    fn parent_is_guardian() {
        let parsed: AuthUser =
            serde_json::from_str(r#"{"id":1,"email":"x","role":["parent"]}"#).unwrap();
        assert_eq!(parsed.primary_role(), UserRole::Guardian);
        assert_eq!("Parent".parse::<UserRole>().unwrap(), UserRole::Guardian);
        assert!("owner".parse::<UserRole>().is_err());
    }

    #[test]
    fn empty_role_list_is_guest() {
        let mut u = user(UserRole::Student);
        u.role.clear();
        assert_eq!(u.primary_role(), UserRole::Guest);
    }

    #[test]
    fn access_rules_by_role() {
        assert!(UserRole::Student.can_access_route("/dashboard/lessons/12"));
        assert!(!UserRole::Student.can_access_route("/admin/users"));
        assert!(!UserRole::Student.can_access_route("/onboarding"));
        assert!(UserRole::Teacher.can_access_route("/dashboard/teacher/lessons"));
        assert!(!UserRole::Admin.can_access_route("/teacher/create"));
        assert!(UserRole::Superadmin.can_access_route("/anything"));
        assert!(UserRole::Guardian.can_access_route("/progress"));
        assert!(!UserRole::Guardian.can_access_route("/billing"));
    }

    #[test]
    fn permissions_follow_hierarchy() {
        assert!(UserRole::Teacher.has_permission(Permission::Student));
        assert!(!UserRole::Teacher.has_permission(Permission::Guardian));
        assert!(UserRole::Admin.has_permission(Permission::Guardian));
        assert!(!UserRole::Admin.has_permission(Permission::Superadmin));
        assert!(!UserRole::Guardian.has_permission(Permission::Student));
    }

    #[test]
    fn root_is_public_only_exactly() {
        assert!(is_public_route("/"));
        assert!(is_public_route("/auth/login"));
        assert!(!is_public_route("/dashboard"));
    }

    #[test]
    fn guard_decisions() {
        assert_eq!(
            route_decision("/dashboard", None),
            RouteDecision::RedirectToLogin {
                callback: "/dashboard".into()
            }
        );
        assert_eq!(route_decision("/auth/register", None), RouteDecision::Public);
        assert_eq!(
            route_decision("/auth/login", Some(&user(UserRole::Teacher))),
            RouteDecision::RedirectHome {
                home: "/dashboard/teacher/lessons"
            }
        );
        assert_eq!(
            route_decision("/dashboard", Some(&user(UserRole::Guest))),
            RouteDecision::RedirectOnboarding
        );
        assert!(matches!(
            route_decision("/onboarding/step-1", Some(&user(UserRole::Guest))),
            RouteDecision::Allow { role: UserRole::Guest, .. }
        ));
        assert_eq!(
            route_decision("/admin/users", Some(&user(UserRole::Student))),
            RouteDecision::Denied {
                role: UserRole::Student,
                home: "/dashboard"
            }
        );
        assert_eq!(
            route_decision("/dashboard/lessons", Some(&user(UserRole::Student))),
            RouteDecision::Allow {
                role: UserRole::Student,
                user_id: UserId::new(42)
            }
        );
    }
}
