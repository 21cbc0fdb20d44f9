use crate::cli::actions::{server, token, useradd, Action};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;

fn jwt_secret(matches: &clap::ArgMatches) -> Result<SecretString> {
    matches
        .get_one::<String>("jwt-secret")
        .map(|secret| SecretString::from(secret.clone()))
        .context("missing required argument: --jwt-secret")
}

/// Map parsed arguments to the action to run.
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some(("server", sub_m)) => Ok(Action::Server(server::Args {
            port: sub_m.get_one::<u16>("port").copied().unwrap_or(8080),
            dsn: sub_m.get_one::<String>("dsn").cloned(),
            jwt_secret: jwt_secret(sub_m)?,
            session_ttl_seconds: sub_m
                .get_one::<i64>("session-ttl")
                .copied()
                .unwrap_or(12 * 60 * 60),
            secure_cookies: sub_m.get_flag("secure-cookies"),
            seed: sub_m.get_one::<String>("seed").cloned(),
            users: sub_m.get_one::<String>("users").cloned(),
        })),
        Some(("useradd", sub_m)) => Ok(Action::UserAdd(useradd::Args {
            dsn: sub_m
                .get_one::<String>("dsn")
                .cloned()
                .context("missing required argument: --dsn")?,
            username: sub_m
                .get_one::<String>("username")
                .cloned()
                .context("missing required argument: --username")?,
            password: sub_m
                .get_one::<String>("password")
                .map(|password| SecretString::from(password.clone()))
                .context("missing required argument: --password")?,
        })),
        Some(("token", sub_m)) => Ok(Action::Token(token::Args {
            jwt_secret: jwt_secret(sub_m)?,
            username: sub_m
                .get_one::<String>("username")
                .cloned()
                .context("missing required argument: --username")?,
            ttl_seconds: sub_m.get_one::<i64>("ttl").copied().unwrap_or(300),
        })),
        Some((name, _)) => Err(anyhow!("unknown subcommand: {name}")),
        None => Err(anyhow!("missing subcommand")),
    }
}
