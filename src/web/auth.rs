use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::{pages, AppState};
use crate::auth::{
    expiry_timestamp, generate_session_token, hash_password, safe_next, session_token,
    verify_password, MaybeUser, SessionDuration,
};
use crate::db::{self as queries, NewUser};
use crate::error::BlogResult;
use crate::forms::{FormErrors, LoginInput, SignupInput};

const USERNAME_TAKEN: &str = "A user with that username already exists.";

const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/signup/", get(signup_page).post(signup_post))
        .route("/auth/login/", get(login_page).post(login_post))
        .route("/auth/logout/", get(logout).post(logout))
}

/// `Set-Cookie` value for a session token; an empty token clears the cookie.
fn session_cookie(token: &str, max_age: i64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!("session={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age}{secure}")
}

#[derive(Debug, Deserialize)]
pub struct NextParams {
    next: Option<String>,
}

/// GET /auth/signup/ - Show the signup form.
async fn signup_page(MaybeUser(user): MaybeUser) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }
    Html(pages::render_signup_page(&SignupInput::default(), &FormErrors::new()).into_string())
        .into_response()
}

/// POST /auth/signup/ - Create an account.
async fn signup_post(
    State(state): State<AppState>,
    Form(form): Form<SignupInput>,
) -> BlogResult<Response> {
    let mut errors = form.validate();
    let username = form.username.trim();

    if errors.field("username").is_empty()
        && queries::username_exists(state.db.pool(), username).await?
    {
        errors.add("username", USERNAME_TAKEN);
    }

    if errors.is_empty() {
        match create_account(state.db.pool(), &form).await? {
            Ok(user_id) => {
                info!(user_id, username, "User signed up");
                return Ok(Redirect::to("/").into_response());
            }
            Err(taken) => errors = taken,
        }
    }

    Ok(Html(pages::render_signup_page(&form, &errors).into_string()).into_response())
}

/// Insert the account for a validated signup form.
///
/// A username claimed between the existence check and the insert comes back
/// as the same field error instead of a server error.
async fn create_account(
    pool: &SqlitePool,
    form: &SignupInput,
) -> BlogResult<Result<i64, FormErrors>> {
    let password_hash = hash_password(&form.password1)?;
    let user = NewUser {
        username: form.username.trim().to_string(),
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        email: form.email.trim().to_string(),
        password_hash,
    };

    match queries::create_user(pool, &user).await {
        Ok(user_id) => Ok(Ok(user_id)),
        Err(e) if queries::is_unique_violation(&e) => {
            warn!(username = %user.username, "Username taken during signup");
            let mut errors = FormErrors::new();
            errors.add("username", USERNAME_TAKEN);
            Ok(Err(errors))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /auth/login/ - Show the login form.
async fn login_page(
    MaybeUser(user): MaybeUser,
    Query(params): Query<NextParams>,
) -> Response {
    if user.is_some() {
        return Redirect::to(safe_next(params.next.as_deref()).unwrap_or("/")).into_response();
    }

    let html = pages::render_login_page(&pages::LoginPageParams {
        next: safe_next(params.next.as_deref()),
        ..pages::LoginPageParams::default()
    });
    Html(html.into_string()).into_response()
}

/// POST /auth/login/ - Verify credentials and start a session.
async fn login_post(
    State(state): State<AppState>,
    Form(form): Form<LoginInput>,
) -> BlogResult<Response> {
    let next = safe_next(form.next.as_deref());
    let failed = |error: &str| {
        let html = pages::render_login_page(&pages::LoginPageParams {
            error: Some(error),
            username: &form.username,
            remember: form.remember_me(),
            next,
        });
        Html(html.into_string()).into_response()
    };

    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return Ok(failed(INVALID_LOGIN));
    }

    let Some(user) = queries::get_user_by_username(state.db.pool(), username).await? else {
        return Ok(failed(INVALID_LOGIN));
    };

    if !verify_password(&form.password, &user.password_hash)? {
        warn!(user_id = user.id, "Failed login attempt");
        return Ok(failed(INVALID_LOGIN));
    }

    if !user.is_active {
        return Ok(failed("This account is inactive."));
    }

    let duration = SessionDuration::from_remember_me(form.remember_me());
    let token = generate_session_token();
    queries::create_session(
        state.db.pool(),
        user.id,
        &token,
        &expiry_timestamp(duration),
    )
    .await?;

    info!(user_id = user.id, remember = form.remember_me(), "User logged in");

    let cookie = session_cookie(&token, duration.as_seconds(), state.config.secure_cookies);
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to(next.unwrap_or("/"))).into_response())
}

/// GET|POST /auth/logout/ - End the current session.
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> BlogResult<Response> {
    if let Some(token) = session_token(&headers) {
        queries::delete_session(state.db.pool(), token).await?;
        info!("User logged out");
    }

    let cookie = session_cookie("", 0, state.config.secure_cookies);
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{count_users, Database};
    use tempfile::TempDir;

    fn signup_form(username: &str) -> SignupInput {
        SignupInput {
            username: username.to_string(),
            password1: "hello friend".to_string(),
            password2: "hello friend".to_string(),
            ..SignupInput::default()
        }
    }

    #[tokio::test]
    async fn test_create_account_reports_taken_username() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(&temp_dir.path().join("test.db")).await.unwrap();

        // Both calls skip the existence check, as two racing signups would.
        let first = create_account(db.pool(), &signup_form("elliot")).await.unwrap();
        assert!(first.is_ok());

        let second = create_account(db.pool(), &signup_form(" elliot "))
            .await
            .unwrap();
        let errors = second.unwrap_err();
        assert_eq!(errors.field("username"), [USERNAME_TAKEN]);
        assert_eq!(count_users(db.pool()).await.unwrap(), 1);
    }

    #[test]
    fn test_session_cookie() {
        assert_eq!(
            session_cookie("abc", 3600, false),
            "session=abc; HttpOnly; SameSite=Lax; Path=/; Max-Age=3600"
        );
        assert_eq!(
            session_cookie("", 0, true),
            "session=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0; Secure"
        );
    }
}
