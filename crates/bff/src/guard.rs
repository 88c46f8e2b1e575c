//! Page guard: session and role checks in front of the web front end's page
//! routes. The pages themselves are mounted with `router_with_pages`; without
//! them an allowed request falls through to the 404 envelope.

use axum::extract::{Request, State};
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;

use lesson_core::model::UserId;
use lesson_core::rbac::{RouteDecision, UserRole, route_decision};

use crate::AppState;
use crate::cookies::AuthSession;
use crate::names;

/// Whether the guard applies to `path`: a guarded prefix followed by nothing or `/`.
#[must_use]
pub fn is_guarded(path: &str) -> bool {
    names::GUARDED_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

#[must_use]
pub fn login_redirect(callback: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("callbackUrl", callback)
        .finish();
    format!("{}?{query}", names::LOGIN_PAGE)
}

/// The signed-in user of an allowed page request, available to page handlers
/// as `Extension<PageUser>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageUser {
    pub role: UserRole,
    pub user_id: UserId,
}

pub async fn page_guard(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if !is_guarded(&path) {
        return next.run(request).await;
    }

    let jar = CookieJar::from_headers(request.headers());
    let session = AuthSession::from_jar(&jar, &state.clock);
    let decision = route_decision(&path, session.as_ref().map(|s| &s.user));
    tracing::debug!(%path, ?decision, "page guard");

    match decision {
        RouteDecision::Public => next.run(request).await,
        RouteDecision::Allow { role, user_id } => {
            request.extensions_mut().insert(PageUser { role, user_id });
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert(
                HeaderName::from_static(names::USER_ROLE_HEADER),
                HeaderValue::from_static(role.as_str()),
            );
            headers.insert(
                HeaderName::from_static(names::USER_ID_HEADER),
                HeaderValue::from(user_id.value()),
            );
            response
        }
        RouteDecision::RedirectToLogin { callback } => {
            Redirect::temporary(&login_redirect(&callback)).into_response()
        }
        RouteDecision::RedirectHome { home } => Redirect::temporary(home).into_response(),
        RouteDecision::RedirectOnboarding => {
            Redirect::temporary(names::ONBOARDING_PAGE).into_response()
        }
        RouteDecision::Denied { role, home } => {
            tracing::info!(%path, role = role.as_str(), "route access denied");
            let mut response = Redirect::temporary(home).into_response();
            let headers = response.headers_mut();
            headers.insert(
                HeaderName::from_static(names::MIDDLEWARE_ERROR_HEADER),
                HeaderValue::from_static(names::RBAC_ACCESS_DENIED),
            );
            headers.insert(
                HeaderName::from_static(names::USER_ROLE_HEADER),
                HeaderValue::from_static(role.as_str()),
            );
            if let Ok(attempted) = HeaderValue::from_str(&path) {
                headers.insert(HeaderName::from_static(names::ATTEMPTED_ROUTE_HEADER), attempted);
            }
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guards_prefixes_on_segment_boundaries() {
        assert!(is_guarded("/dashboard"));
        assert!(is_guarded("/dashboard/lessons/3"));
        assert!(is_guarded("/auth/login"));
        assert!(!is_guarded("/dashboards"));
        assert!(!is_guarded("/api/lessons/meta"));
        assert!(!is_guarded("/"));
    }

    #[test]
    fn login_redirect_encodes_callback() {
        assert_eq!(
            login_redirect("/dashboard/lessons"),
            "/auth/login?callbackUrl=%2Fdashboard%2Flessons"
        );
    }
}
