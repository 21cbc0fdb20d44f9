use crate::cli::actions::{server, token, useradd, Action};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Server(args) => server::execute(args).await,
        Action::UserAdd(args) => useradd::execute(args).await,
        Action::Token(args) => token::execute(&args),
    }
}
