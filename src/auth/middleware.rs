use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::warn;

use super::session::{format_timestamp, SESSION_COOKIE};
use crate::db::{self as queries, User};

/// Login page path; `next` is appended by [`login_redirect`].
pub const LOGIN_PATH: &str = "/auth/login/";

/// Current authenticated user (if any).
/// Use this extractor when authentication is optional.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
    SqlitePool: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pool = SqlitePool::from_ref(state);

        let Some(token) = session_token(&parts.headers) else {
            return Ok(Self(None));
        };

        let session = match queries::get_session_by_token(&pool, token).await {
            Ok(Some(session)) => session,
            Ok(None) => return Ok(Self(None)),
            Err(e) => {
                warn!("Session lookup failed: {e:#}");
                return Ok(Self(None));
            }
        };

        if session.expires_at < format_timestamp(Utc::now()) {
            let _ = queries::delete_session(&pool, token).await;
            return Ok(Self(None));
        }

        let user = match queries::get_user_by_id(&pool, session.user_id).await {
            Ok(Some(user)) if user.is_active => user,
            _ => return Ok(Self(None)),
        };

        let _ = queries::update_session_last_used(&pool, session.id).await;

        Ok(Self(Some(user)))
    }
}

/// Current authenticated user (required).
/// Anonymous requests are redirected to the login page with `next` set to
/// the requested path.
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
    SqlitePool: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;

        match user {
            Some(user) => Ok(Self(user)),
            None => {
                let target = parts
                    .uri
                    .path_and_query()
                    .map_or_else(|| parts.uri.path(), |pq| pq.as_str());
                Err(login_redirect(target))
            }
        }
    }
}

/// Redirect to the login page, returning to `next` afterwards.
#[must_use]
pub fn login_redirect(next: &str) -> Response {
    Redirect::to(&format!("{LOGIN_PATH}?next={}", urlencoding::encode(next))).into_response()
}

/// Session token from the `Cookie` header, if present.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            cookie
                .trim()
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .filter(|token| !token.is_empty())
}
