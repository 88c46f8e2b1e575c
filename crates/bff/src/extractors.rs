use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;

use crate::AppState;
use crate::cookies::AuthSession;
use crate::error::BffError;

/// Guard extractor: a valid cookie session or a 401 envelope.
pub struct RequireAuth(pub AuthSession);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = BffError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        AuthSession::from_jar(&jar, &state.clock)
            .map(RequireAuth)
            .ok_or(BffError::Unauthorized)
    }
}

/// The cookie session if there is a valid one.
pub struct MaybeAuth(pub Option<AuthSession>);

impl FromRequestParts<AppState> for MaybeAuth {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(MaybeAuth(AuthSession::from_jar(&jar, &state.clock)))
    }
}
