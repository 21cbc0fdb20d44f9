//! Bearer token refresh. Independent of the session cookie.

use axum::{
    extract::Extension,
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, info_span, instrument};

use super::{state::AuthState, token::RefreshError, types::TokenResponse};
use crate::recipes::error::{ApiError, ErrorResponse};

/// Read the token from `Authorization`, with or without a `Bearer` prefix.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = match value.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        None if value.eq_ignore_ascii_case("bearer") => "",
        _ => value,
    };
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[utoipa::path(
    post,
    path = "/refresh",
    responses(
        (status = 200, description = "New token valid for five minutes", body = TokenResponse),
        (status = 400, description = "Token has more than 30 seconds left", body = ErrorResponse),
        (status = 401, description = "Missing, forged or expired token", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
#[instrument(name = "auth.refresh", skip_all)]
pub async fn refresh(
    headers: HeaderMap,
    Extension(auth_state): Extension<Arc<AuthState>>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = info_span!("validate")
        .in_scope(|| extract_token(&headers))
        .ok_or(RefreshError::InvalidToken)?;

    let issued = auth_state.tokens().refresh(&token, Utc::now())?;

    Ok(info_span!("respond").in_scope(|| {
        info!("Token refreshed, expires {}", issued.expires);
        Json(TokenResponse {
            token: issued.token,
            expires: issued.expires,
        })
    }))
}
