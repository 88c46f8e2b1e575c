//! The three HTTP-only cookies that carry a login session.

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use lesson_core::Clock;
use lesson_core::rbac::AuthUser;

use crate::names;

/// A session read back from `auth_token`, `auth_user` and `auth_expires`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub user: AuthUser,
    /// Unix epoch milliseconds.
    pub expires_at: i64,
}

impl AuthSession {
    /// Valid only when all three cookies are present, the expiry parses and
    /// lies in the future, and the user record parses with a role list.
    #[must_use]
    pub fn from_jar(jar: &CookieJar, clock: &Clock) -> Option<Self> {
        let token = jar.get(names::AUTH_TOKEN_COOKIE_NAME)?.value();
        let user = jar.get(names::AUTH_USER_COOKIE_NAME)?.value();
        let expires = jar.get(names::AUTH_EXPIRES_COOKIE_NAME)?.value();
        if token.is_empty() {
            return None;
        }

        let expires_at: i64 = expires.trim().parse().ok()?;
        if clock.is_expired(expires_at) {
            return None;
        }
        let user: AuthUser = match serde_json::from_str(user) {
            Ok(user) => user,
            Err(err) => {
                tracing::debug!(error = %err, "ignoring malformed auth_user cookie");
                return None;
            }
        };
        Some(Self {
            token: token.to_string(),
            user,
            expires_at,
        })
    }
}

fn session_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    let max_age = time::Duration::try_from(names::SESSION_TTL).unwrap_or(time::Duration::WEEK);
    Cookie::build((name, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(secure)
        .max_age(max_age)
        .build()
}

/// Add the session cookies. `user` is stored as its JSON encoding.
///
/// # Errors
///
/// Returns the serialization error if `user` cannot be encoded.
pub fn set_session(
    jar: CookieJar,
    token: &str,
    user: &serde_json::Value,
    expires_at: i64,
    secure: bool,
) -> Result<CookieJar, serde_json::Error> {
    let user = serde_json::to_string(user)?;
    Ok(jar
        .add(session_cookie(names::AUTH_TOKEN_COOKIE_NAME, token.to_string(), secure))
        .add(session_cookie(names::AUTH_USER_COOKIE_NAME, user, secure))
        .add(session_cookie(
            names::AUTH_EXPIRES_COOKIE_NAME,
            expires_at.to_string(),
            secure,
        )))
}

/// Expire all session cookies.
#[must_use]
pub fn clear_session(jar: CookieJar) -> CookieJar {
    [
        names::AUTH_TOKEN_COOKIE_NAME,
        names::AUTH_USER_COOKIE_NAME,
        names::AUTH_EXPIRES_COOKIE_NAME,
    ]
    .into_iter()
    .fold(jar, |jar, name| {
        jar.remove(Cookie::build(name).path("/").build())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::rbac::UserRole;
    use lesson_core::time::fixed_clock;

    fn jar(token: &str, user: &str, expires: &str) -> CookieJar {
        CookieJar::new()
            .add(Cookie::new(names::AUTH_TOKEN_COOKIE_NAME, token.to_string()))
            .add(Cookie::new(names::AUTH_USER_COOKIE_NAME, user.to_string()))
            .add(Cookie::new(names::AUTH_EXPIRES_COOKIE_NAME, expires.to_string()))
    }

    const USER: &str = r#"{"id":7,"email":"ada@example.com","role":["student"]}"#;

    #[test]
    fn reads_a_valid_session() {
        let clock = fixed_clock();
        let expires = (clock.now_millis() + 60_000).to_string();
        let session = AuthSession::from_jar(&jar("tok", USER, &expires), &clock).unwrap();
        assert_eq!(session.token, "tok");
        assert_eq!(session.user.primary_role(), UserRole::Student);
    }

    #[test]
    fn rejects_expired_missing_or_malformed() {
        let clock = fixed_clock();
        let now = clock.now_millis().to_string();
        let later = (clock.now_millis() + 60_000).to_string();

        assert!(AuthSession::from_jar(&jar("tok", USER, &now), &clock).is_none());
        assert!(AuthSession::from_jar(&jar("tok", USER, "soon"), &clock).is_none());
        assert!(AuthSession::from_jar(&jar("tok", r#"{"id":7}"#, &later), &clock).is_none());
        assert!(AuthSession::from_jar(&jar("tok", "not json", &later), &clock).is_none());

        let partial = CookieJar::new().add(Cookie::new(names::AUTH_TOKEN_COOKIE_NAME, "tok"));
        assert!(AuthSession::from_jar(&partial, &clock).is_none());
    }

    #[test]
    fn session_cookies_are_http_only_lax() {
        let user = serde_json::json!({"id": 7, "role": ["student"]});
        let jar = set_session(CookieJar::new(), "tok", &user, 123, true).unwrap();
        let token = jar.get(names::AUTH_TOKEN_COOKIE_NAME).unwrap();
        assert_eq!(token.http_only(), Some(true));
        assert_eq!(token.same_site(), Some(SameSite::Lax));
        assert_eq!(token.secure(), Some(true));
        assert_eq!(token.path(), Some("/"));
        assert_eq!(token.max_age(), Some(time::Duration::days(7)));
        assert_eq!(jar.get(names::AUTH_EXPIRES_COOKIE_NAME).unwrap().value(), "123");

        let cleared = clear_session(jar);
        assert!(cleared.get(names::AUTH_TOKEN_COOKIE_NAME).is_none());
    }
}
