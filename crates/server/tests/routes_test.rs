// Router tests for Hushboard
// Drives the full app (in-memory storage, stubbed Google) with tower's oneshot.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use hushboard_core::{Error, InMemoryUserStore, UserStore};
use hushboard_server::{
    auth::{AuthConfig, OAuthProvider, OAuthUserInfo},
    build_router,
    storage::StorageBackend,
    AppState,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

const STUB_AUTH_URL: &str = "https://accounts.example.test/auth";

/// Google stand-in: `good-code` belongs to `g123`, anything else fails upstream
struct StubGoogle;

#[async_trait]
impl OAuthProvider for StubGoogle {
    fn authorization_url(&self, state: &str) -> String {
        format!("{}?state={}", STUB_AUTH_URL, state)
    }

    async fn exchange_code(&self, code: &str) -> hushboard_core::Result<OAuthUserInfo> {
        match code {
            "good-code" => Ok(OAuthUserInfo {
                provider_id: "g123".to_string(),
            }),
            _ => Err(Error::upstream("token endpoint said no")),
        }
    }
}

struct TestApp {
    router: Router,
    users: InMemoryUserStore,
}

impl TestApp {
    fn new() -> Self {
        Self::build(true)
    }

    fn without_oauth() -> Self {
        Self::build(false)
    }

    fn build(with_oauth: bool) -> Self {
        let backend = StorageBackend::in_memory();
        let users = match &backend {
            StorageBackend::InMemory { users, .. } => users.clone(),
            StorageBackend::Postgres(_) => unreachable!(),
        };

        let mut state = AppState::new(&backend, AuthConfig::default()).unwrap();
        if with_oauth {
            state = state.with_oauth_provider(Arc::new(StubGoogle));
        }
        let static_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../../public");

        Self {
            router: build_router(state, static_dir),
            users,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
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

    /// POST with a body but no form content type
    async fn post_raw(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Register and return the `name=value` session cookie
    async fn register(&self, username: &str, password: &str) -> String {
        let response = self
            .post_form(
                "/register",
                &format!("username={}&password={}", username, password),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/secrets");
        session_cookie(&response).expect("registration sets a session cookie")
    }
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// The `name=value` part of a Set-Cookie header for `name`, if it carries a value
fn cookie_pair(response: &Response<Body>, name: &str) -> Option<String> {
    set_cookies(response)
        .into_iter()
        .filter_map(|c| c.split(';').next().map(str::to_string))
        .find(|pair| pair.starts_with(&format!("{}=", name)) && pair.len() > name.len() + 1)
}

fn session_cookie(response: &Response<Body>) -> Option<String> {
    cookie_pair(response, "hushboard_session")
}

async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn is_login_form(body: &str) -> bool {
    body.contains(r#"action="/login""#)
}

fn is_submit_form(body: &str) -> bool {
    body.contains(r#"action="/submit""#)
}

// ============================================
// Pages
// ============================================

#[tokio::test]
async fn test_public_pages_render() {
    let app = TestApp::new();

    for uri in ["/", "/login", "/register", "/secrets"] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {}", uri);
        assert!(body_string(response).await.contains("<html"));
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_static_files_are_served() {
    let app = TestApp::new();
    let response = app.get("/css/styles.css", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get("/no/such/file.txt", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================
// Local accounts
// ============================================

#[tokio::test]
async fn test_submit_page_requires_login() {
    let app = TestApp::new();

    let anonymous = body_string(app.get("/submit", None).await).await;
    assert!(is_login_form(&anonymous));
    assert!(!is_submit_form(&anonymous));

    let cookie = app.register("alice", "hunter2").await;
    let response = app.get("/submit", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(is_submit_form(&body_string(response).await));
}

#[tokio::test]
async fn test_login_after_registration() {
    let app = TestApp::new();
    app.register("alice", "hunter2").await;

    let response = app
        .post_form("/login", "username=alice&password=hunter2", None)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/secrets");

    let cookie = session_cookie(&response).expect("login sets a session cookie");
    let set_cookie = set_cookies(&response).join("\n");
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));

    let body = body_string(app.get("/submit", Some(&cookie)).await).await;
    assert!(is_submit_form(&body));
}

#[tokio::test]
async fn test_duplicate_registration_redirects_back() {
    let app = TestApp::new();
    app.register("alice", "hunter2").await;

    let response = app
        .post_form("/register", "username=alice&password=other", None)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/register");
    assert!(session_cookie(&response).is_none());
    assert_eq!(app.users.len(), 1);
}

#[tokio::test]
async fn test_concurrent_registrations_one_wins() {
    let app = TestApp::new();

    let (a, b) = tokio::join!(
        app.post_form("/register", "username=carol&password=pw-a", None),
        app.post_form("/register", "username=carol&password=pw-b", None),
    );

    let winners = [&a, &b]
        .iter()
        .filter(|r| location(r) == "/secrets")
        .count();
    assert_eq!(winners, 1);
    assert_eq!(app.users.len(), 1);
}

#[tokio::test]
async fn test_wrong_password_stays_anonymous() {
    let app = TestApp::new();
    app.register("alice", "hunter2").await;

    let response = app
        .post_form("/login", "username=alice&password=wrong", None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&response).is_none());

    let body = body_string(response).await;
    assert!(is_login_form(&body));
    assert!(body.contains("Invalid username or password"));
}

#[tokio::test]
async fn test_padded_username_logs_in() {
    let app = TestApp::new();
    app.register("+alice", "pw").await;

    let response = app
        .post_form("/login", "username=+alice&password=pw", None)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/secrets");
    assert!(session_cookie(&response).is_some());

    let user = app.users.find_by_username("alice").await.unwrap();
    assert!(user.is_some());
}

#[tokio::test]
async fn test_login_without_form_body_renders_login() {
    let app = TestApp::new();
    let response = app
        .post_raw("/login", "username=alice&password=pw", None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&response).is_none());

    let body = body_string(response).await;
    assert!(is_login_form(&body));
    assert!(!body.contains("Content-Type"));
}

#[tokio::test]
async fn test_register_without_form_body_redirects_back() {
    let app = TestApp::new();
    let response = app
        .post_raw("/register", "username=alice&password=pw", None)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/register");
    assert!(app.users.is_empty());
}

#[tokio::test]
async fn test_unknown_user_login_fails() {
    let app = TestApp::new();
    let response = app
        .post_form("/login", "username=ghost&password=boo", None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&response).is_none());
}

// ============================================
// Secrets
// ============================================

#[tokio::test]
async fn test_post_secret_sets_only_own_secret() {
    let app = TestApp::new();
    let alice = app.register("alice", "pw1").await;
    app.register("bob", "pw2").await;

    let response = app
        .post_form("/submit", "secret=I+sing+in+the+shower", Some(&alice))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/secrets");

    let alice_user = app.users.find_by_username("alice").await.unwrap().unwrap();
    let bob_user = app.users.find_by_username("bob").await.unwrap().unwrap();
    assert_eq!(alice_user.secret.as_deref(), Some("I sing in the shower"));
    assert!(bob_user.secret.is_none());

    let body = body_string(app.get("/secrets", None).await).await;
    assert!(body.contains("I sing in the shower"));
    assert!(!body.contains("alice"));
}

#[tokio::test]
async fn test_unauthenticated_submit_is_rejected() {
    let app = TestApp::new();
    app.register("alice", "pw1").await;

    let response = app.post_form("/submit", "secret=sneaky", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(is_login_form(&body_string(response).await));
    assert!(app.users.list_with_secrets().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unauthenticated_submit_without_form_body_is_rejected() {
    let app = TestApp::new();

    let response = app.post_raw("/submit", "secret=sneaky", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_string(response).await;
    assert!(is_login_form(&body));
    assert!(!body.contains("Content-Type"));
}

#[tokio::test]
async fn test_authenticated_submit_without_form_body_writes_nothing() {
    let app = TestApp::new();
    let alice = app.register("alice", "pw1").await;

    let response = app.post_raw("/submit", "secret=sneaky", Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/submit");
    assert!(app.users.list_with_secrets().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_with_unknown_token_is_rejected() {
    let app = TestApp::new();
    let forged = format!("hushboard_session={}", "ab".repeat(32));

    let response = app.post_form("/submit", "secret=sneaky", Some(&forged)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.users.list_with_secrets().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_resubmitting_replaces_secret() {
    let app = TestApp::new();
    let alice = app.register("alice", "pw1").await;

    app.post_form("/submit", "secret=first", Some(&alice)).await;
    app.post_form("/submit", "secret=second", Some(&alice)).await;

    let secrets = app.users.list_with_secrets().await.unwrap();
    assert_eq!(secrets.len(), 1);
    assert_eq!(secrets[0].secret.as_deref(), Some("second"));
}

// ============================================
// Logout
// ============================================

#[tokio::test]
async fn test_logout_invalidates_token() {
    let app = TestApp::new();
    let cookie = app.register("alice", "pw1").await;

    let response = app.get("/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(set_cookies(&response)
        .iter()
        .any(|c| c.starts_with("hushboard_session=") && c.contains("Max-Age=0")));

    // Replaying the old cookie gets the anonymous experience
    let body = body_string(app.get("/submit", Some(&cookie)).await).await;
    assert!(is_login_form(&body));

    let response = app.post_form("/submit", "secret=late", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_when_anonymous() {
    let app = TestApp::new();
    let response = app.get("/logout", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

// ============================================
// Google OAuth
// ============================================

/// Start the OAuth flow, returning the state and its cookie
async fn begin_oauth(app: &TestApp) -> (String, String) {
    let response = app.get("/auth/google", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let url = location(&response).to_string();
    assert!(url.starts_with(STUB_AUTH_URL));
    let state = url.split("state=").nth(1).unwrap().to_string();

    let cookie = cookie_pair(&response, "oauth_state").expect("state cookie is set");
    assert_eq!(cookie, format!("oauth_state={}", state));
    (state, cookie)
}

#[tokio::test]
async fn test_oauth_login_creates_user_once() {
    let app = TestApp::new();

    for _ in 0..2 {
        let (state, cookie) = begin_oauth(&app).await;
        let response = app
            .get(
                &format!("/auth/google/secrets?code=good-code&state={}", state),
                Some(&cookie),
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/secrets");

        let session = session_cookie(&response).expect("callback sets a session cookie");
        let body = body_string(app.get("/submit", Some(&session)).await).await;
        assert!(is_submit_form(&body));
    }

    assert_eq!(app.users.len(), 1);
    let user = app.users.find_by_federated_id("g123").await.unwrap().unwrap();
    assert!(user.username.is_none());
}

#[tokio::test]
async fn test_oauth_state_mismatch_is_rejected() {
    let app = TestApp::new();
    let (_, cookie) = begin_oauth(&app).await;

    let response = app
        .get(
            "/auth/google/secrets?code=good-code&state=forged",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert!(session_cookie(&response).is_none());
    assert!(app.users.is_empty());
}

#[tokio::test]
async fn test_oauth_callback_without_state_cookie_is_rejected() {
    let app = TestApp::new();
    let (state, _) = begin_oauth(&app).await;

    let response = app
        .get(
            &format!("/auth/google/secrets?code=good-code&state={}", state),
            None,
        )
        .await;
    assert_eq!(location(&response), "/login");
    assert!(app.users.is_empty());
}

#[tokio::test]
async fn test_oauth_provider_failures_redirect_to_login() {
    let app = TestApp::new();

    let (state, cookie) = begin_oauth(&app).await;
    let response = app
        .get(
            &format!("/auth/google/secrets?code=bad-code&state={}", state),
            Some(&cookie),
        )
        .await;
    assert_eq!(location(&response), "/login");

    let (state, cookie) = begin_oauth(&app).await;
    let response = app
        .get(
            &format!("/auth/google/secrets?error=access_denied&state={}", state),
            Some(&cookie),
        )
        .await;
    assert_eq!(location(&response), "/login");
    assert!(app.users.is_empty());
}

#[tokio::test]
async fn test_oauth_not_configured() {
    let app = TestApp::without_oauth();

    let response = app.get("/auth/google", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert!(cookie_pair(&response, "oauth_state").is_none());
}
