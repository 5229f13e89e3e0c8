//! Integration tests for web routes, driven through the full router.

use std::path::Path;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use blogfeed::auth::{expiry_timestamp, generate_session_token, hash_password, SessionDuration};
use blogfeed::config::Config;
use blogfeed::db::{
    count_comments_for_post, count_follows, count_posts, count_users, create_session, create_user,
    get_post, get_user_by_username, insert_post, update_user_active, Database, NewPost, NewUser,
};
use blogfeed::web::{create_app, AppState};
use tempfile::TempDir;
use tower::ServiceExt;

const PASSWORD: &str = "correct horse battery";
const BOUNDARY: &str = "blogfeed-test-boundary";

fn test_config(dir: &Path, home_feed_cache_ttl: Duration) -> Config {
    Config {
        database_path: dir.join("test.db"),
        web_host: "127.0.0.1".to_string(),
        web_port: 0,
        static_dir: dir.join("static"),
        max_upload_bytes: 1024 * 1024,
        secure_cookies: false,
        media_dir: dir.join("media"),
        posts_per_page: 10,
        home_feed_cache_ttl,
        session_cleanup_interval: Duration::from_secs(3600),
    }
}

struct TestApp {
    db: Database,
    app: Router,
    _temp_dir: TempDir,
}

impl TestApp {
    /// App with the home cache off, so every request sees current posts.
    async fn new() -> Self {
        Self::with_home_cache(Duration::ZERO).await
    }

    async fn with_home_cache(ttl: Duration) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = test_config(temp_dir.path(), ttl);
        let db = Database::new(&config.database_path)
            .await
            .expect("Failed to create database");
        let app = create_app(AppState::new(config, db.clone()));
        Self {
            db,
            app,
            _temp_dir: temp_dir,
        }
    }

    async fn user(&self, username: &str) -> i64 {
        create_user(
            self.db.pool(),
            &NewUser {
                username: username.to_string(),
                first_name: String::new(),
                last_name: String::new(),
                email: String::new(),
                password_hash: hash_password(PASSWORD).expect("Failed to hash password"),
            },
        )
        .await
        .expect("Failed to create user")
    }

    /// Log `user_id` in directly and return the session cookie header value.
    async fn login(&self, user_id: i64) -> String {
        let token = generate_session_token();
        create_session(
            self.db.pool(),
            user_id,
            &token,
            &expiry_timestamp(SessionDuration::Short),
        )
        .await
        .expect("Failed to create session");
        format!("session={token}")
    }

    async fn post(&self, author_id: i64, text: &str) -> i64 {
        insert_post(
            self.db.pool(),
            author_id,
            &NewPost {
                text: text.to_string(),
                group_id: None,
                image: None,
            },
        )
        .await
        .expect("Failed to insert post")
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn post_multipart(&self, uri: &str, fields: &[(&str, &str)], cookie: &str) -> Response {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header(header::COOKIE, cookie)
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("missing Location header")
        .to_str()
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;
    let response = app.get("/healthz", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}

#[tokio::test]
async fn test_public_pages_render() {
    let app = TestApp::new().await;
    let author = app.user("writer").await;
    let post_id = app.post(author, "Hello from the feed").await;

    for uri in [
        "/",
        "/?page=7",
        "/?page=abc",
        "/profile/writer/",
        "/about/author/",
        "/about/tech/",
        "/auth/login/",
        "/auth/signup/",
    ] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
    }

    let response = app.get(&format!("/posts/{post_id}/"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Hello from the feed"));
}

#[tokio::test]
async fn test_unknown_resources_are_not_found() {
    let app = TestApp::new().await;
    let user = app.user("reader").await;
    let cookie = app.login(user).await;

    for uri in [
        "/no/such/page/",
        "/group/missing/",
        "/profile/nobody/",
        "/posts/999/",
        "/posts/abc/",
    ] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {uri}");
    }

    let response = app.get("/profile/nobody/follow/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get("/posts/abc/edit/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .post_form("/posts/999/comment/", "text=hi", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_anonymous_users_are_sent_to_login() {
    let app = TestApp::new().await;
    let author = app.user("writer").await;
    let post_id = app.post(author, "locked down").await;

    for (uri, expected) in [
        ("/create/", "/auth/login/?next=%2Fcreate%2F"),
        ("/follow/", "/auth/login/?next=%2Ffollow%2F"),
        (
            "/profile/writer/follow/",
            "/auth/login/?next=%2Fprofile%2Fwriter%2Ffollow%2F",
        ),
    ] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "GET {uri}");
        assert_eq!(location(&response), expected);
    }

    let edit = format!("/posts/{post_id}/edit/");
    let response = app.get(&edit, None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        format!("/auth/login/?next=%2Fposts%2F{post_id}%2Fedit%2F")
    );

    let response = app
        .post_form(&format!("/posts/{post_id}/comment/"), "text=hi", None)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/auth/login/?next="));
    assert_eq!(count_comments_for_post(app.db.pool(), post_id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_post_via_form() {
    let app = TestApp::new().await;
    let author = app.user("writer").await;
    let cookie = app.login(author).await;

    let response = app.get("/create/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .post_multipart("/create/", &[("text", "Posted over HTTP"), ("group", "")], &cookie)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/profile/writer/");
    assert_eq!(count_posts(app.db.pool()).await.unwrap(), 1);

    let home = body_text(app.get("/", None).await).await;
    assert!(home.contains("Posted over HTTP"));
}

#[tokio::test]
async fn test_invalid_post_form_is_shown_again() {
    let app = TestApp::new().await;
    let author = app.user("writer").await;
    let cookie = app.login(author).await;

    let response = app
        .post_multipart("/create/", &[("text", "   "), ("group", "")], &cookie)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("This field is required."));
    assert_eq!(count_posts(app.db.pool()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_author_can_edit_post() {
    let app = TestApp::new().await;
    let author = app.user("writer").await;
    let cookie = app.login(author).await;
    let post_id = app.post(author, "before").await;

    let response = app.get(&format!("/posts/{post_id}/edit/"), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("before"));

    let response = app
        .post_multipart(
            &format!("/posts/{post_id}/edit/"),
            &[("text", "after"), ("group", "")],
            &cookie,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/posts/{post_id}/"));

    let post = get_post(app.db.pool(), post_id).await.unwrap().unwrap();
    assert_eq!(post.text, "after");
    assert_eq!(count_posts(app.db.pool()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_non_author_edit_redirects_to_post() {
    let app = TestApp::new().await;
    let author = app.user("writer").await;
    let intruder = app.user("intruder").await;
    let cookie = app.login(intruder).await;
    let post_id = app.post(author, "untouchable").await;

    let response = app.get(&format!("/posts/{post_id}/edit/"), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/posts/{post_id}/"));

    let response = app
        .post_multipart(
            &format!("/posts/{post_id}/edit/"),
            &[("text", "defaced"), ("group", "")],
            &cookie,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/posts/{post_id}/"));

    let response = app
        .post_form(&format!("/posts/{post_id}/delete/"), "", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/posts/{post_id}/"));

    let post = get_post(app.db.pool(), post_id).await.unwrap().unwrap();
    assert_eq!(post.text, "untouchable");
}

#[tokio::test]
async fn test_author_can_delete_post() {
    let app = TestApp::new().await;
    let author = app.user("writer").await;
    let cookie = app.login(author).await;
    let post_id = app.post(author, "gone soon").await;

    let response = app
        .post_form(&format!("/posts/{post_id}/delete/"), "", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/profile/writer/");
    assert!(get_post(app.db.pool(), post_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_comment_redirects_to_post() {
    let app = TestApp::new().await;
    let author = app.user("writer").await;
    let reader = app.user("reader").await;
    let cookie = app.login(reader).await;
    let post_id = app.post(author, "comment here").await;

    let uri = format!("/posts/{post_id}/comment/");
    let response = app.post_form(&uri, "text=Great+post", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/posts/{post_id}/"));

    // Blank comments are dropped but still redirect
    let response = app.post_form(&uri, "text=+++", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert_eq!(count_comments_for_post(app.db.pool(), post_id).await.unwrap(), 1);
    let page = body_text(app.get(&format!("/posts/{post_id}/"), None).await).await;
    assert!(page.contains("Great post"));
}

#[tokio::test]
async fn test_follow_and_unfollow_via_routes() {
    let app = TestApp::new().await;
    let author = app.user("writer").await;
    let reader = app.user("reader").await;
    let cookie = app.login(reader).await;
    app.post(author, "followed content").await;

    let response = app.get("/profile/writer/follow/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/profile/writer/");
    assert_eq!(count_follows(app.db.pool()).await.unwrap(), 1);

    // Following twice changes nothing
    app.post_form("/profile/writer/follow/", "", Some(&cookie))
        .await;
    assert_eq!(count_follows(app.db.pool()).await.unwrap(), 1);

    let feed = body_text(app.get("/follow/", Some(&cookie)).await).await;
    assert!(feed.contains("followed content"));

    let response = app.get("/profile/writer/unfollow/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(count_follows(app.db.pool()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_self_follow_via_route_is_ignored() {
    let app = TestApp::new().await;
    let user = app.user("narcissus").await;
    let cookie = app.login(user).await;

    let response = app.get("/profile/narcissus/follow/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(count_follows(app.db.pool()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_signup_login_logout() {
    let app = TestApp::new().await;

    let response = app
        .post_form(
            "/auth/signup/",
            "first_name=Elliot&last_name=Alderson&username=elliot&email=elliot%40example.com&password1=hello+friend&password2=hello+friend",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let user = get_user_by_username(app.db.pool(), "elliot")
        .await
        .unwrap()
        .expect("user should exist");
    assert_eq!(user.first_name, "Elliot");

    // Same username again is a form error
    let response = app
        .post_form(
            "/auth/signup/",
            "username=elliot&password1=hello+friend&password2=hello+friend",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response)
        .await
        .contains("A user with that username already exists."));
    assert_eq!(count_users(app.db.pool()).await.unwrap(), 1);

    let response = app
        .post_form(
            "/auth/login/",
            "username=elliot&password=wrong+password",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let response = app
        .post_form(
            "/auth/login/",
            "username=elliot&password=hello+friend&next=%2Fcreate%2F",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/create/");
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("session="));
    assert!(set_cookie.contains("HttpOnly"));

    let cookie = set_cookie.split(';').next().unwrap().to_string();
    let response = app.get("/create/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.post_form("/auth/logout/", "", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app.get("/create/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_login_ignores_offsite_next() {
    let app = TestApp::new().await;
    app.user("elliot").await;

    let response = app
        .post_form(
            "/auth/login/",
            "username=elliot&password=correct+horse+battery&next=%2F%2Fevil.example%2F",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_inactive_user_cannot_log_in_or_browse() {
    let app = TestApp::new().await;
    let user = app.user("elliot").await;
    let cookie = app.login(user).await;
    update_user_active(app.db.pool(), user, false).await.unwrap();

    let response = app
        .post_form(
            "/auth/login/",
            "username=elliot&password=correct+horse+battery",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(body_text(response).await.contains("This account is inactive."));

    // Existing sessions stop working too
    let response = app.get("/create/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_home_page_is_served_from_cache() {
    let app = TestApp::with_home_cache(Duration::from_secs(3600)).await;
    let author = app.user("writer").await;
    app.post(author, "Already here").await;

    let home = body_text(app.get("/", None).await).await;
    assert!(home.contains("Already here"));

    app.post(author, "Fresh off the press").await;

    let home = body_text(app.get("/", None).await).await;
    assert!(home.contains("Already here"));
    assert!(!home.contains("Fresh off the press"));

    // Other feeds are never cached
    let profile = body_text(app.get("/profile/writer/", None).await).await;
    assert!(profile.contains("Fresh off the press"));
}
