use crate::recipes::handlers::auth::TokenSigner;
use anyhow::Result;
use chrono::{Duration, Utc};
use secrecy::SecretString;
use serde_json::json;

#[derive(Debug)]
pub struct Args {
    pub jwt_secret: SecretString,
    pub username: String,
    pub ttl_seconds: i64,
}

/// Print a freshly signed bearer token as JSON.
/// # Errors
/// Returns an error if the token cannot be signed.
pub fn execute(args: &Args) -> Result<()> {
    let signer = TokenSigner::new(args.jwt_secret.clone());
    let issued = signer.issue(
        &args.username,
        Utc::now(),
        Duration::seconds(args.ttl_seconds),
    )?;
    let output = json!({
        "token": issued.token,
        "expires": issued.expires,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
