//! Password hashing with Argon2.
//!
//! Hashes are salted PHC strings. Hashing and verification are CPU heavy, so
//! both run on the blocking pool.

use anyhow::{anyhow, Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::OnceCell;

/// Hash checked against when the username is unknown.
static DUMMY_HASH: OnceCell<String> = OnceCell::const_new();

async fn dummy_hash() -> Result<&'static str> {
    DUMMY_HASH
        .get_or_try_init(|| hash_password(SecretString::from("recipes-unknown-user")))
        .await
        .map(String::as_str)
}

/// Compute the dummy hash ahead of the first sign-in.
/// # Errors
/// Returns an error if hashing fails.
pub async fn warm_up() -> Result<()> {
    dummy_hash().await.map(|_| ())
}

/// Spend the same Argon2 work as [`verify_password`] for a user that does not
/// exist. The outcome is always a failed check.
/// # Errors
/// Returns an error if the dummy hash cannot be computed.
pub async fn verify_unknown_user(password: SecretString) -> Result<()> {
    let stored_hash = dummy_hash().await?.to_string();
    verify_password(password, stored_hash).await?;
    Ok(())
}

/// Hash a password into an Argon2id PHC string.
/// # Errors
/// Returns an error if hashing fails or the blocking task panics.
pub async fn hash_password(password: SecretString) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.expose_secret().as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| anyhow!("failed to hash password: {err}"))
    })
    .await
    .context("password hashing task failed")?
}

/// Check a password against a stored PHC string.
///
/// A malformed stored hash verifies as `false`.
/// # Errors
/// Returns an error only if the blocking task panics.
pub async fn verify_password(password: SecretString, stored_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        let Ok(parsed) = PasswordHash::new(&stored_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.expose_secret().as_bytes(), &parsed)
            .is_ok()
    })
    .await
    .context("password verification task failed")
}
