//! HS256 bearer tokens and the refresh policy.
//!
//! Flow Overview:
//! 1) Parse `header.claims.signature` and check the HMAC-SHA256 signature.
//! 2) Reject tokens that are already expired; refresh renews live tokens only.
//! 3) Reject tokens with more than [`REFRESH_WINDOW_SECONDS`] left.
//! 4) Issue a new token for the same username valid for [`TOKEN_TTL_SECONDS`].

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Remaining lifetime below which a token may be refreshed.
pub const REFRESH_WINDOW_SECONDS: i64 = 30;
/// Lifetime of a reissued token.
pub const TOKEN_TTL_SECONDS: i64 = 5 * 60;

const ALG: &str = "HS256";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefreshError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token is not expired yet")]
    NotYetExpiring,
    #[error("Failed to sign token")]
    Signing(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct TokenHeader {
    alg: String,
    typ: String,
}

/// Claims carried by a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthClaims {
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

/// A signed token and its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires: DateTime<Utc>,
}

pub struct TokenSigner {
    secret: SecretString,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, RefreshError> {
    let json = serde_json::to_vec(value).map_err(|err| RefreshError::Signing(err.to_string()))?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: DeserializeOwned>(s: &str) -> Result<T, RefreshError> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| RefreshError::InvalidToken)?;
    serde_json::from_slice(&bytes).map_err(|_| RefreshError::InvalidToken)
}

impl TokenSigner {
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    fn mac(&self) -> Result<HmacSha256, RefreshError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|err| RefreshError::Signing(err.to_string()))
    }

    fn sign(&self, claims: &AuthClaims) -> Result<String, RefreshError> {
        let header = TokenHeader {
            alg: ALG.to_string(),
            typ: "JWT".to_string(),
        };
        let signing_input = format!("{}.{}", b64e_json(&header)?, b64e_json(claims)?);
        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        Ok(format!(
            "{signing_input}.{}",
            Base64UrlUnpadded::encode_string(&signature)
        ))
    }

    /// Mint a token for `username` expiring `ttl` after `now`.
    /// # Errors
    /// Returns `RefreshError::Signing` if the claims cannot be encoded.
    pub fn issue(
        &self,
        username: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<IssuedToken, RefreshError> {
        let expires = now + ttl;
        let claims = AuthClaims {
            username: username.to_string(),
            exp: expires.timestamp(),
            iat: now.timestamp(),
        };
        let token = self.sign(&claims)?;
        Ok(IssuedToken {
            token,
            expires: DateTime::from_timestamp(claims.exp, 0).unwrap_or(expires),
        })
    }

    /// Parse a token and verify its signature and expiry.
    /// # Errors
    /// Returns `RefreshError::InvalidToken` for malformed, forged or expired tokens.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<AuthClaims, RefreshError> {
        let mut parts = token.trim().split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(RefreshError::InvalidToken);
        };

        let header: TokenHeader = b64d_json(header_b64)?;
        if header.alg != ALG {
            return Err(RefreshError::InvalidToken);
        }

        let signature =
            Base64UrlUnpadded::decode_vec(signature_b64).map_err(|_| RefreshError::InvalidToken)?;
        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature).map_err(|_| RefreshError::InvalidToken)?;

        let claims: AuthClaims = b64d_json(claims_b64)?;
        if claims.exp <= now.timestamp() {
            return Err(RefreshError::InvalidToken);
        }
        Ok(claims)
    }

    /// Renew a live token that is close to expiry.
    /// # Errors
    /// Returns `InvalidToken` if verification fails and `NotYetExpiring` if
    /// more than [`REFRESH_WINDOW_SECONDS`] remain.
    pub fn refresh(&self, token: &str, now: DateTime<Utc>) -> Result<IssuedToken, RefreshError> {
        let claims = self.verify(token, now)?;
        if claims.exp - now.timestamp() > REFRESH_WINDOW_SECONDS {
            return Err(RefreshError::NotYetExpiring);
        }
        self.issue(&claims.username, now, Duration::seconds(TOKEN_TTL_SECONDS))
    }
}
