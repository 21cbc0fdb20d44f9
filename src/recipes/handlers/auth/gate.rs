//! Session gate for mutating routes.
//!
//! [`Session`] is an extractor: listing it among a handler's arguments
//! resolves the cookie before the handler body runs, and rejects with 403
//! otherwise.

use anyhow::anyhow;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use tracing::{debug, info_span, Instrument};

use super::{session::extract_session_token, utils::hash_session_token};
use crate::recipes::{
    error::ApiError,
    store::{SessionStore, SharedSessionStore},
};

/// The signed-in user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub username: String,
}

/// Resolve the session cookie to a live session.
///
/// A missing cookie and an unknown or expired session are both
/// [`ApiError::NotAuthorized`].
pub(crate) async fn authorize(
    sessions: &dyn SessionStore,
    headers: &HeaderMap,
) -> Result<Session, ApiError> {
    let Some(token) = extract_session_token(headers) else {
        debug!("Request without session cookie");
        return Err(ApiError::NotAuthorized);
    };

    match sessions.lookup_session(&hash_session_token(&token)).await? {
        Some(record) => Ok(Session {
            username: record.username,
        }),
        None => {
            debug!("Session cookie does not match a live session");
            Err(ApiError::NotAuthorized)
        }
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(sessions) =
            Extension::<SharedSessionStore>::from_request_parts(parts, state)
                .await
                .map_err(|err| ApiError::Storage(anyhow!("session store unavailable: {err}")))?;

        authorize(sessions.as_ref(), &parts.headers)
            .instrument(info_span!("auth.gate"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::store::MemoryStore;
    use anyhow::Result;
    use axum::http::{header::COOKIE, HeaderValue};

    fn cookie(token: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&format!("recipes_session={token}"))?);
        Ok(headers)
    }

    #[tokio::test]
    async fn live_session_is_authorized() -> Result<()> {
        let store = MemoryStore::new();
        store
            .insert_session(&hash_session_token("token"), "admin", 60)
            .await?;
        let session = authorize(&store, &cookie("token")?).await;
        assert!(matches!(session, Ok(Session { ref username }) if username == "admin"));
        Ok(())
    }

    #[tokio::test]
    async fn missing_cookie_is_forbidden() {
        let store = MemoryStore::new();
        let result = authorize(&store, &HeaderMap::new()).await;
        assert!(matches!(result, Err(ApiError::NotAuthorized)));
    }

    #[tokio::test]
    async fn unknown_and_expired_sessions_are_forbidden() -> Result<()> {
        let store = MemoryStore::new();
        store
            .insert_session(&hash_session_token("stale"), "admin", -1)
            .await?;

        let unknown = authorize(&store, &cookie("nope")?).await;
        assert!(matches!(unknown, Err(ApiError::NotAuthorized)));

        let expired = authorize(&store, &cookie("stale")?).await;
        assert!(matches!(expired, Err(ApiError::NotAuthorized)));
        Ok(())
    }
}
