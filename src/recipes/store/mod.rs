//! Storage for recipes, users and sessions.
//!
//! Handlers only see the traits below. [`PgStore`] is the production backend;
//! [`MemoryStore`] keeps everything in process and backs development runs and
//! the router tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

pub mod memory;
pub mod postgres;
mod search;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use search::TagQuery;

/// A stored recipe, including the server-assigned `id` and `publishedAt`.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub published_at: DateTime<Utc>,
}

impl Recipe {
    /// Build a new record from a draft, assigning a fresh id.
    pub(crate) fn from_draft(draft: RecipeDraft, published_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: draft.name,
            tags: draft.tags,
            ingredients: draft.ingredients,
            instructions: draft.instructions,
            published_at,
        }
    }

    /// Replace the mutable fields; `id` and `published_at` never change.
    pub(crate) fn apply(&mut self, draft: RecipeDraft) {
        self.name = draft.name;
        self.tags = draft.tags;
        self.ingredients = draft.ingredients;
        self.instructions = draft.instructions;
    }
}

/// Client-supplied recipe fields. Unknown fields (`id`, `publishedAt`) are ignored.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeDraft {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

/// Result of an update or delete addressed by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    NotFound,
}

/// Result of inserting a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserOutcome {
    Created,
    Conflict,
}

/// A live session resolved from a cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Store a new recipe with a fresh id and the current timestamp.
    async fn create(&self, draft: RecipeDraft) -> Result<Recipe>;

    /// All recipes in store order.
    async fn list(&self) -> Result<Vec<Recipe>>;

    async fn get(&self, id: Uuid) -> Result<Option<Recipe>>;

    /// Replace name, tags, ingredients and instructions. Never inserts.
    async fn update(&self, id: Uuid, draft: RecipeDraft) -> Result<MutationOutcome>;

    async fn delete(&self, id: Uuid) -> Result<MutationOutcome>;

    /// Recipes sharing at least one tag with `query`, compared case-insensitively.
    async fn find_by_tags(&self, query: &TagQuery) -> Result<Vec<Recipe>>;

    async fn count(&self) -> Result<u64>;

    /// Bulk insert used for seeding; returns how many recipes were stored.
    async fn import(&self, drafts: Vec<RecipeDraft>) -> Result<usize>;

    /// Check the backend is reachable.
    async fn ping(&self) -> Result<()>;
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Stored password hash for `username`, if the user exists.
    async fn password_hash(&self, username: &str) -> Result<Option<String>>;

    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<UserOutcome>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a session keyed by the hash of its token.
    async fn insert_session(
        &self,
        token_hash: &[u8],
        username: &str,
        ttl_seconds: i64,
    ) -> Result<()>;

    /// Resolve a token hash; expired sessions are reported as absent.
    async fn lookup_session(&self, token_hash: &[u8]) -> Result<Option<SessionRecord>>;

    /// Remove a session. Missing sessions are not an error.
    async fn delete_session(&self, token_hash: &[u8]) -> Result<()>;
}

pub type SharedRecipeStore = Arc<dyn RecipeStore>;
pub type SharedCredentialStore = Arc<dyn CredentialStore>;
pub type SharedSessionStore = Arc<dyn SessionStore>;

/// The three stores the router needs, usually backed by the same backend.
#[derive(Clone)]
pub struct Stores {
    pub recipes: SharedRecipeStore,
    pub credentials: SharedCredentialStore,
    pub sessions: SharedSessionStore,
}

impl Stores {
    #[must_use]
    pub fn memory() -> Self {
        Self::from_backend(Arc::new(MemoryStore::new()))
    }

    #[must_use]
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self::from_backend(Arc::new(PgStore::new(pool)))
    }

    fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: RecipeStore + CredentialStore + SessionStore + 'static,
    {
        Self {
            recipes: backend.clone(),
            credentials: backend.clone(),
            sessions: backend,
        }
    }
}
