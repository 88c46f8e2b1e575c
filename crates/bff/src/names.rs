use std::time::Duration;

pub const AUTH_TOKEN_COOKIE_NAME: &str = "auth_token";
pub const AUTH_USER_COOKIE_NAME: &str = "auth_user";
pub const AUTH_EXPIRES_COOKIE_NAME: &str = "auth_expires";

/// How long a login session lasts.
pub const SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:3000";

pub const LOGIN_URL: &str = "/api/auth/login";
pub const LOGOUT_URL: &str = "/api/auth/logout";
pub const ME_URL: &str = "/api/auth/me";

pub const LOGIN_PAGE: &str = "/auth/login";
pub const ONBOARDING_PAGE: &str = "/onboarding";

// Page guard headers
pub const MIDDLEWARE_ERROR_HEADER: &str = "x-middleware-error";
pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const USER_ID_HEADER: &str = "x-user-id";
pub const ATTEMPTED_ROUTE_HEADER: &str = "x-attempted-route";
pub const RBAC_ACCESS_DENIED: &str = "RBAC_ACCESS_DENIED";

/// Page prefixes the guard runs on.
pub const GUARDED_PREFIXES: &[&str] = &[
    "/dashboard",
    "/billing",
    "/settings",
    "/admin",
    "/guest",
    "/guardian",
    "/teacher",
    "/auth",
    "/onboarding",
];
