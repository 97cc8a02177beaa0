// Authentication HTTP routes
// Decision: Form posts answer with redirects (303) so a browser refresh never re-submits
// Decision: OAuth `state` round-trips through a short-lived cookie scoped to the callback path

use axum::{
    extract::{rejection::FormRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use hushboard_core::{Error, User};
use serde::Deserialize;

use super::{
    middleware::CurrentSession,
    oauth::generate_state,
    session::SessionManager,
};
use crate::{api::PageError, AppState};

/// Cookie holding the pending OAuth `state`
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";
const OAUTH_STATE_PATH: &str = "/auth/google";
const OAUTH_STATE_MAX_AGE_MINUTES: i64 = 10;

const LOGIN_FAILED_MESSAGE: &str = "Invalid username or password";

/// Login / registration form
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// OAuth callback query
#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/register", get(register_page).post(register))
        .route("/logout", get(logout))
        .route("/auth/google", get(oauth_redirect))
        .route("/auth/google/secrets", get(oauth_callback))
}

/// GET /login
pub async fn login_page(State(state): State<AppState>) -> Result<Response, PageError> {
    Ok(state.views.login(None)?.into_response())
}

/// GET /register
pub async fn register_page(State(state): State<AppState>) -> Result<Response, PageError> {
    Ok(state.views.register()?.into_response())
}

/// POST /login - verify local credentials and start a session
pub async fn login(
    State(state): State<AppState>,
    session: CurrentSession,
    jar: CookieJar,
    form: Result<Form<CredentialsForm>, FormRejection>,
) -> Result<Response, PageError> {
    let Ok(Form(form)) = form.map_err(log_rejection) else {
        let page = state.views.login(Some(LOGIN_FAILED_MESSAGE))?;
        return Ok((StatusCode::UNAUTHORIZED, page).into_response());
    };

    match state
        .verifier
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(user) => {
            let jar = sign_in(&state.sessions, &session, jar, &user).await?;
            tracing::info!(user_id = %user.id, "Local login succeeded");
            Ok((jar, Redirect::to("/secrets")).into_response())
        }
        Err(Error::InvalidCredentials) => {
            tracing::info!("Local login failed");
            let page = state.views.login(Some(LOGIN_FAILED_MESSAGE))?;
            Ok((StatusCode::UNAUTHORIZED, page).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /register - create a local user and start a session
pub async fn register(
    State(state): State<AppState>,
    session: CurrentSession,
    jar: CookieJar,
    form: Result<Form<CredentialsForm>, FormRejection>,
) -> Result<Response, PageError> {
    let Ok(Form(form)) = form.map_err(log_rejection) else {
        return Ok(Redirect::to("/register").into_response());
    };

    match state.verifier.register(&form.username, &form.password).await {
        Ok(user) => {
            let jar = sign_in(&state.sessions, &session, jar, &user).await?;
            Ok((jar, Redirect::to("/secrets")).into_response())
        }
        Err(e @ (Error::DuplicateUsername | Error::InvalidCredentials)) => {
            tracing::info!("Registration rejected: {}", e);
            Ok(Redirect::to("/register").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /logout - end the session server-side and clear the cookie
pub async fn logout(
    State(state): State<AppState>,
    session: CurrentSession,
    jar: CookieJar,
) -> Result<Response, PageError> {
    if let Some(token) = &session.token {
        state.sessions.destroy(token).await?;
    }
    if let Some(principal) = &session.principal {
        tracing::info!(user_id = %principal.user_id, "Logged out");
    }

    let jar = jar.remove(SessionManager::removal_cookie());
    Ok((jar, Redirect::to("/")).into_response())
}

/// GET /auth/google - redirect to the Google consent screen
pub async fn oauth_redirect(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(provider) = state.oauth.as_ref() else {
        tracing::warn!("Google sign-in requested but Google OAuth is not configured");
        return Redirect::to("/login").into_response();
    };

    let oauth_state = generate_state();
    let url = provider.authorization_url(&oauth_state);

    let cookie = Cookie::build((OAUTH_STATE_COOKIE, oauth_state))
        .path(OAUTH_STATE_PATH)
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(OAUTH_STATE_MAX_AGE_MINUTES))
        .build();

    (jar.add(cookie), Redirect::to(&url)).into_response()
}

/// GET /auth/google/secrets - OAuth callback
pub async fn oauth_callback(
    State(state): State<AppState>,
    session: CurrentSession,
    jar: CookieJar,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<Response, PageError> {
    let expected_state = jar.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(Cookie::build(OAUTH_STATE_COOKIE).path(OAUTH_STATE_PATH));
    let to_login = |jar: CookieJar| -> Result<Response, PageError> {
        Ok((jar, Redirect::to("/login")).into_response())
    };

    let Some(provider) = state.oauth.as_ref() else {
        tracing::warn!("OAuth callback received but Google OAuth is not configured");
        return to_login(jar);
    };

    if let Some(error) = &query.error {
        tracing::info!(error = %error, "OAuth provider returned an error");
        return to_login(jar);
    }

    let code = match (&query.code, &query.state, &expected_state) {
        (Some(code), Some(got), Some(expected)) if got == expected => code,
        _ => {
            tracing::warn!("OAuth callback rejected: missing code or state mismatch");
            return to_login(jar);
        }
    };

    let user_info = match provider.exchange_code(code).await {
        Ok(info) => info,
        Err(e) => {
            tracing::error!("OAuth exchange failed: {}", e);
            return to_login(jar);
        }
    };

    let user = state
        .verifier
        .resolve_federated(&user_info.provider_id)
        .await?;
    let jar = sign_in(&state.sessions, &session, jar, &user).await?;
    tracing::info!(user_id = %user.id, "Federated login succeeded");

    Ok((jar, Redirect::to("/secrets")).into_response())
}

/// Malformed form posts are handled like empty ones; the rejection text never reaches the client
pub(crate) fn log_rejection(rejection: FormRejection) {
    tracing::info!(status = %rejection.status(), "Rejected form body: {}", rejection.body_text());
}

/// Replace whatever session the client carried with a fresh one for `user`
async fn sign_in(
    sessions: &SessionManager,
    previous: &CurrentSession,
    jar: CookieJar,
    user: &User,
) -> Result<CookieJar, PageError> {
    if let Some(token) = &previous.token {
        if let Err(e) = sessions.destroy(token).await {
            tracing::warn!("Failed to drop previous session: {}", e);
        }
    }

    let token = sessions.establish(user).await?;
    Ok(jar.add(sessions.session_cookie(token)))
}
