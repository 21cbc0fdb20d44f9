//! # Recipes (catalog API)
//!
//! `recipes` serves a catalog of recipe records over HTTP. Anyone can list and
//! tag-search recipes; creating, updating and deleting them requires a signed-in
//! session.
//!
//! ## Credentials
//!
//! Two independent credential channels exist:
//!
//! - **Session cookie:** `POST /signin` verifies the password against the stored
//!   Argon2 hash and sets an opaque `recipes_session` cookie. Only the SHA-256 of
//!   the cookie value is stored server side. Protected routes consult this cookie
//!   and nothing else; a missing or expired session yields `403 Forbidden`.
//! - **Bearer token:** `POST /refresh` renews an HS256 token that is within 30
//!   seconds of expiry, issuing a new one valid for 5 minutes. It never consults
//!   the session store.
//!
//! ## Storage
//!
//! Recipes, users and sessions live in Postgres when a DSN is configured, or in
//! an in-process store otherwise. Both backends sit behind the same traits in
//! [`recipes::store`].

pub mod cli;
pub mod recipes;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
