//! Auth configuration and shared state.

use super::token::TokenSigner;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 12 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    session_ttl_seconds: i64,
    secure_cookies: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            secure_cookies: false,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    /// Only mark cookies `Secure` when the service sits behind HTTPS.
    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.secure_cookies
    }
}

/// Shared by the auth handlers through an `Extension`.
#[derive(Debug)]
pub struct AuthState {
    config: AuthConfig,
    tokens: TokenSigner,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, tokens: TokenSigner) -> Self {
        Self { config, tokens }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenSigner {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_config_defaults() {
        let config = AuthConfig::new();
        assert_eq!(config.session_ttl_seconds(), 12 * 60 * 60);
        assert!(!config.session_cookie_secure());
    }

    #[test]
    fn auth_config_builders() {
        let config = AuthConfig::new()
            .with_session_ttl_seconds(60)
            .with_secure_cookies(true);
        assert_eq!(config.session_ttl_seconds(), 60);
        assert!(config.session_cookie_secure());
    }
}
