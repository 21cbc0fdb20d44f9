//! Sign-in and sign-out: the cookie-backed session channel.

use anyhow::anyhow;
use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::{
        header::{InvalidHeaderValue, COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::IntoResponse,
    Json,
};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{error, info, info_span, instrument};

use super::{
    password::{verify_password, verify_unknown_user},
    state::{AuthConfig, AuthState},
    types::{MessageResponse, SignInRequest},
    utils::{generate_session_token, hash_session_token},
};
use crate::recipes::{
    error::{ApiError, ErrorResponse},
    store::{CredentialStore, SessionStore, SharedCredentialStore, SharedSessionStore},
};

pub(crate) const SESSION_COOKIE_NAME: &str = "recipes_session";

/// Verify credentials and open a session, returning the raw session token.
///
/// Unknown users and wrong passwords fail the same way and cost the same
/// Argon2 work, so neither the response nor its timing reveals a username.
pub(crate) async fn sign_in(
    credentials: &dyn CredentialStore,
    sessions: &dyn SessionStore,
    config: &AuthConfig,
    username: &str,
    password: SecretString,
) -> Result<String, ApiError> {
    let Some(stored_hash) = credentials.password_hash(username).await? else {
        verify_unknown_user(password).await?;
        return Err(ApiError::InvalidCredentials);
    };
    if !verify_password(password, stored_hash).await? {
        return Err(ApiError::InvalidCredentials);
    }

    let token = generate_session_token()?;
    sessions
        .insert_session(
            &hash_session_token(&token),
            username,
            config.session_ttl_seconds(),
        )
        .await?;
    Ok(token)
}

#[utoipa::path(
    post,
    path = "/signin",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "User signed in, session cookie set", body = MessageResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 401, description = "Invalid username or password", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(name = "auth.signin", skip_all)]
pub async fn signin(
    Extension(credentials): Extension<SharedCredentialStore>,
    Extension(sessions): Extension<SharedSessionStore>,
    Extension(auth_state): Extension<Arc<AuthState>>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = info_span!("validate").in_scope(|| -> Result<SignInRequest, ApiError> {
        let Json(request) =
            payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        if request.username.trim().is_empty() || request.password.is_empty() {
            return Err(ApiError::Validation(
                "username and password are required".to_string(),
            ));
        }
        Ok(request)
    })?;

    let token = sign_in(
        credentials.as_ref(),
        sessions.as_ref(),
        auth_state.config(),
        &request.username,
        SecretString::from(request.password),
    )
    .await?;

    info_span!("respond").in_scope(|| -> Result<_, ApiError> {
        let cookie = session_cookie(auth_state.config(), &token)
            .map_err(|err| ApiError::Storage(anyhow!("invalid session cookie: {err}")))?;
        info!("User {} signed in", request.username);
        Ok((
            StatusCode::OK,
            [(SET_COOKIE, cookie)],
            Json(MessageResponse::new("User signed in")),
        ))
    })
}

#[utoipa::path(
    post,
    path = "/signout",
    responses(
        (status = 200, description = "Session cleared", body = MessageResponse)
    ),
    tag = "auth"
)]
#[instrument(name = "auth.signout", skip_all)]
pub async fn signout(
    headers: HeaderMap,
    Extension(sessions): Extension<SharedSessionStore>,
    Extension(auth_state): Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    if let Some(token) = extract_session_token(&headers) {
        let token_hash = hash_session_token(&token);
        if let Err(err) = sessions.delete_session(&token_hash).await {
            error!("Failed to delete session: {err:#}");
        }
    }

    // Always clear the cookie, even if the session record was missing.
    info_span!("respond").in_scope(|| {
        let mut response_headers = HeaderMap::new();
        if let Ok(cookie) = clear_session_cookie(auth_state.config()) {
            response_headers.insert(SET_COOKIE, cookie);
        }
        (
            StatusCode::OK,
            response_headers,
            Json(MessageResponse::new("User logged out")),
        )
    })
}

/// Build an `HttpOnly` cookie for the session token.
pub(crate) fn session_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Read the session token from the `Cookie` header.
pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next().map(str::trim);
            let val = parts.next().map(str::trim);
            if let (Some(SESSION_COOKIE_NAME), Some(val)) = (key, val) {
                if !val.is_empty() {
                    return Some(val.to_string());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::{
        handlers::auth::password::hash_password,
        store::{MemoryStore, UserOutcome},
    };
    use anyhow::Result;
    use std::time::Instant;

    async fn store_with_user() -> Result<MemoryStore> {
        let store = MemoryStore::new();
        let hash = hash_password(SecretString::from("RE4zfHB35VPtTkbT")).await?;
        assert_eq!(store.insert_user("packt", &hash).await?, UserOutcome::Created);
        Ok(store)
    }

    #[test]
    fn session_cookie_attributes() -> Result<()> {
        let config = AuthConfig::new().with_session_ttl_seconds(60);
        let cookie = session_cookie(&config, "abc")?;
        assert_eq!(
            cookie.to_str()?,
            "recipes_session=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=60"
        );

        let secure = session_cookie(&config.with_secure_cookies(true), "abc")?;
        assert!(secure.to_str()?.ends_with("; Secure"));
        Ok(())
    }

    #[test]
    fn clear_cookie_expires_immediately() -> Result<()> {
        let cookie = clear_session_cookie(&AuthConfig::new())?;
        assert!(cookie.to_str()?.contains("Max-Age=0"));
        Ok(())
    }

    #[test]
    fn extract_session_token_from_cookie_list() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; recipes_session=tok123; other=1"),
        );
        assert_eq!(extract_session_token(&headers), Some("tok123".to_string()));
    }

    #[test]
    fn extract_session_token_missing_or_empty() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_session_token(&headers), None);
        headers.insert(COOKIE, HeaderValue::from_static("recipes_session="));
        assert_eq!(extract_session_token(&headers), None);
    }

    #[tokio::test]
    async fn sign_in_creates_session() -> Result<()> {
        let store = store_with_user().await?;
        let token = sign_in(
            &store,
            &store,
            &AuthConfig::new(),
            "packt",
            SecretString::from("RE4zfHB35VPtTkbT"),
        )
        .await?;
        let record = store.lookup_session(&hash_session_token(&token)).await?;
        assert_eq!(record.map(|r| r.username).as_deref(), Some("packt"));
        Ok(())
    }

    #[tokio::test]
    async fn sign_in_issues_fresh_tokens() -> Result<()> {
        let store = store_with_user().await?;
        let config = AuthConfig::new();
        let password = || SecretString::from("RE4zfHB35VPtTkbT");
        let first = sign_in(&store, &store, &config, "packt", password()).await?;
        let second = sign_in(&store, &store, &config, "packt", password()).await?;
        assert_ne!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn sign_in_rejects_wrong_password_and_unknown_user() -> Result<()> {
        let store = store_with_user().await?;
        let config = AuthConfig::new();

        let wrong = sign_in(&store, &store, &config, "packt", SecretString::from("nope")).await;
        assert!(matches!(wrong, Err(ApiError::InvalidCredentials)));

        let unknown = sign_in(&store, &store, &config, "ghost", SecretString::from("nope")).await;
        assert!(matches!(unknown, Err(ApiError::InvalidCredentials)));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_user_costs_a_password_check() -> Result<()> {
        let store = store_with_user().await?;
        let config = AuthConfig::new();
        crate::recipes::handlers::auth::password::warm_up().await?;

        let started = Instant::now();
        let wrong = sign_in(&store, &store, &config, "packt", SecretString::from("nope")).await;
        let known = started.elapsed();
        assert!(matches!(wrong, Err(ApiError::InvalidCredentials)));

        let started = Instant::now();
        let unknown = sign_in(&store, &store, &config, "ghost", SecretString::from("nope")).await;
        let missing = started.elapsed();
        assert!(matches!(unknown, Err(ApiError::InvalidCredentials)));

        // Both paths run one Argon2 verification; skipping it would be orders
        // of magnitude faster.
        assert!(missing * 4 >= known, "unknown {missing:?} vs known {known:?}");
        Ok(())
    }
}
