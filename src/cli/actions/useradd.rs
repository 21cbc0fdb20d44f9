use crate::recipes::{
    handlers::auth::password,
    store::{postgres, CredentialStore, PgStore, UserOutcome},
};
use anyhow::{anyhow, Result};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub dsn: String,
    pub username: String,
    pub password: SecretString,
}

/// Hash the password and store the user.
/// # Errors
/// Returns an error if the username is invalid, the user exists, or the database fails.
pub async fn execute(args: Args) -> Result<()> {
    if !valid_username(&args.username) {
        return Err(anyhow!(
            "invalid username {:?}: use 1-64 letters, digits, '.', '_' or '-'",
            args.username
        ));
    }
    if args.password.expose_secret().is_empty() {
        return Err(anyhow!("password must not be empty"));
    }

    let password_hash = password::hash_password(args.password).await?;

    let store = PgStore::new(postgres::connect(&args.dsn).await?);
    match store.insert_user(&args.username, &password_hash).await? {
        UserOutcome::Created => {
            info!("Created user {}", args.username);
            println!("user {} created", args.username);
            Ok(())
        }
        UserOutcome::Conflict => Err(anyhow!("user {} already exists", args.username)),
    }
}

pub(crate) fn valid_username(username: &str) -> bool {
    Regex::new(r"^[A-Za-z0-9._-]{1,64}$").is_ok_and(|regex| regex.is_match(username))
}
