// Session extractor and authorization gate
// Decision: Session resolution never rejects; anonymous is a valid state and each handler decides
// Decision: One gate (`require_authenticated`) serves both /submit handlers

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use hushboard_core::{Error, Principal};
use std::convert::Infallible;

use super::session::{SessionManager, SESSION_COOKIE};

/// The request's resolved session
#[derive(Debug, Clone, Default)]
pub struct CurrentSession {
    /// Principal if the cookie resolved to a live session
    pub principal: Option<Principal>,
    /// Raw token as sent by the client, live or not
    pub token: Option<String>,
}

impl CurrentSession {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// Authorization gate for protected actions
    pub fn require_authenticated(&self) -> Result<&Principal, Error> {
        self.principal.as_ref().ok_or(Error::Unauthenticated)
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
    SessionManager: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Ok(Self::anonymous());
        };

        let token = cookie.value().to_string();
        let sessions = SessionManager::from_ref(state);
        let principal = sessions.restore(&token).await;

        if principal.is_none() {
            tracing::debug!("Session cookie did not resolve to a live session");
        }

        Ok(Self {
            principal,
            token: Some(token),
        })
    }
}
