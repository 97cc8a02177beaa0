// Page routes: landing page, secret submission, the secrets wall and health
// Decision: /secrets is public; it only ever exposes the secret strings, never who wrote them

use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, Router,
};
use hushboard_core::Error;
use serde::{Deserialize, Serialize};

use super::common::PageError;
use crate::{
    auth::{routes::log_rejection, CurrentSession},
    AppState,
};

/// Secret submission form
#[derive(Debug, Deserialize)]
pub struct SecretForm {
    #[serde(default)]
    pub secret: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub storage: &'static str,
}

/// Create page routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/submit", get(submit_page).post(submit))
        .route("/secrets", get(secrets))
        .route("/health", get(health))
}

/// GET /
pub async fn home(State(state): State<AppState>) -> Result<Response, PageError> {
    Ok(state.views.home()?.into_response())
}

/// GET /submit - form for signed-in users, login form for everyone else
pub async fn submit_page(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Response, PageError> {
    let page = match session.require_authenticated() {
        Ok(_) => state.views.submit()?,
        Err(_) => state.views.login(None)?,
    };
    Ok(page.into_response())
}

/// POST /submit - set the signed-in user's secret
pub async fn submit(
    State(state): State<AppState>,
    session: CurrentSession,
    form: Result<Form<SecretForm>, FormRejection>,
) -> Result<Response, PageError> {
    // Gate first: anonymous posts get the login view whatever the body looks like
    let Ok(principal) = session.require_authenticated() else {
        tracing::info!("Rejected secret submission without a session");
        return unauthenticated(&state);
    };

    let Ok(Form(form)) = form.map_err(log_rejection) else {
        return Ok(Redirect::to("/submit").into_response());
    };

    let secret = form.secret.trim();
    if secret.is_empty() {
        return Ok(Redirect::to("/submit").into_response());
    }

    let Some(mut user) = state.users.find_by_id(principal.user_id).await? else {
        tracing::warn!(user_id = %principal.user_id, "Session refers to a user that no longer exists");
        return unauthenticated(&state);
    };

    user.secret = Some(secret.to_string());
    match state.users.save(&user).await {
        Ok(()) => {}
        Err(Error::NotFound) => {
            tracing::warn!(user_id = %user.id, "User disappeared before the secret was saved");
            return unauthenticated(&state);
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(user_id = %user.id, "Secret updated");
    Ok(Redirect::to("/secrets").into_response())
}

/// GET /secrets - every posted secret, anonymized
pub async fn secrets(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Response, PageError> {
    let secrets: Vec<String> = state
        .users
        .list_with_secrets()
        .await?
        .into_iter()
        .filter_map(|user| user.secret)
        .collect();

    tracing::debug!(count = secrets.len(), "Listing secrets");
    Ok(state
        .views
        .secrets(&secrets, session.is_authenticated())?
        .into_response())
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage,
    })
}

fn unauthenticated(state: &AppState) -> Result<Response, PageError> {
    let page = state.views.login(None)?;
    Ok((StatusCode::UNAUTHORIZED, page).into_response())
}
