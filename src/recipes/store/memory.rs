//! In-process backend.
//!
//! Recipes are kept in an id-keyed map plus an insertion-order list behind one
//! `RwLock`, so writers are serialized and lookups by id stay O(1).

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::{
    CredentialStore, MutationOutcome, Recipe, RecipeDraft, RecipeStore, SessionRecord,
    SessionStore, TagQuery, UserOutcome,
};

#[derive(Default)]
struct RecipeTable {
    by_id: HashMap<Uuid, Recipe>,
    order: Vec<Uuid>,
}

impl RecipeTable {
    fn insert(&mut self, draft: RecipeDraft) -> Recipe {
        let recipe = Recipe::from_draft(draft, Utc::now());
        self.order.push(recipe.id);
        self.by_id.insert(recipe.id, recipe.clone());
        recipe
    }

    fn ordered(&self) -> impl Iterator<Item = &Recipe> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    recipes: RwLock<RecipeTable>,
    users: RwLock<HashMap<String, String>>,
    sessions: RwLock<HashMap<Vec<u8>, SessionRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn read_span(operation: &'static str) -> tracing::Span {
    info_span!("storage.read", db.system = "memory", db.operation = operation)
}

fn write_span(operation: &'static str) -> tracing::Span {
    info_span!("storage.write", db.system = "memory", db.operation = operation)
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn create(&self, draft: RecipeDraft) -> Result<Recipe> {
        async {
            let mut table = self.recipes.write().await;
            Ok(table.insert(draft))
        }
        .instrument(write_span("insert"))
        .await
    }

    async fn list(&self) -> Result<Vec<Recipe>> {
        async {
            let table = self.recipes.read().await;
            Ok(table.ordered().cloned().collect())
        }
        .instrument(read_span("list"))
        .await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Recipe>> {
        async {
            let table = self.recipes.read().await;
            Ok(table.by_id.get(&id).cloned())
        }
        .instrument(read_span("get"))
        .await
    }

    async fn update(&self, id: Uuid, draft: RecipeDraft) -> Result<MutationOutcome> {
        async {
            let mut table = self.recipes.write().await;
            match table.by_id.get_mut(&id) {
                Some(recipe) => {
                    recipe.apply(draft);
                    Ok(MutationOutcome::Applied)
                }
                None => Ok(MutationOutcome::NotFound),
            }
        }
        .instrument(write_span("update"))
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<MutationOutcome> {
        async {
            let mut table = self.recipes.write().await;
            if table.by_id.remove(&id).is_none() {
                return Ok(MutationOutcome::NotFound);
            }
            table.order.retain(|existing| *existing != id);
            Ok(MutationOutcome::Applied)
        }
        .instrument(write_span("delete"))
        .await
    }

    async fn find_by_tags(&self, query: &TagQuery) -> Result<Vec<Recipe>> {
        async {
            let table = self.recipes.read().await;
            Ok(table
                .ordered()
                .filter(|recipe| query.matches(&recipe.tags))
                .cloned()
                .collect())
        }
        .instrument(read_span("find_by_tags"))
        .await
    }

    async fn count(&self) -> Result<u64> {
        async {
            let table = self.recipes.read().await;
            Ok(table.order.len() as u64)
        }
        .instrument(read_span("count"))
        .await
    }

    async fn import(&self, drafts: Vec<RecipeDraft>) -> Result<usize> {
        async {
            let mut table = self.recipes.write().await;
            let count = drafts.len();
            for draft in drafts {
                table.insert(draft);
            }
            Ok(count)
        }
        .instrument(write_span("import"))
        .await
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn password_hash(&self, username: &str) -> Result<Option<String>> {
        async {
            let users = self.users.read().await;
            Ok(users.get(username).cloned())
        }
        .instrument(read_span("find_user"))
        .await
    }

    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<UserOutcome> {
        async {
            let mut users = self.users.write().await;
            if users.contains_key(username) {
                return Ok(UserOutcome::Conflict);
            }
            users.insert(username.to_string(), password_hash.to_string());
            Ok(UserOutcome::Created)
        }
        .instrument(write_span("insert_user"))
        .await
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert_session(
        &self,
        token_hash: &[u8],
        username: &str,
        ttl_seconds: i64,
    ) -> Result<()> {
        async {
            let mut sessions = self.sessions.write().await;
            let now = Utc::now();
            // Drop expired sessions while holding the lock anyway.
            sessions.retain(|_, record| record.expires_at > now);
            sessions.insert(
                token_hash.to_vec(),
                SessionRecord {
                    username: username.to_string(),
                    expires_at: now + Duration::seconds(ttl_seconds),
                },
            );
            Ok(())
        }
        .instrument(write_span("insert_session"))
        .await
    }

    async fn lookup_session(&self, token_hash: &[u8]) -> Result<Option<SessionRecord>> {
        async {
            let sessions = self.sessions.read().await;
            Ok(sessions
                .get(token_hash)
                .filter(|record| record.expires_at > Utc::now())
                .cloned())
        }
        .instrument(read_span("lookup_session"))
        .await
    }

    async fn delete_session(&self, token_hash: &[u8]) -> Result<()> {
        async {
            let mut sessions = self.sessions.write().await;
            sessions.remove(token_hash);
            Ok(())
        }
        .instrument(write_span("delete_session"))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn draft(name: &str, tags: &[&str]) -> RecipeDraft {
        RecipeDraft {
            name: name.to_string(),
            tags: tags.iter().map(ToString::to_string).collect(),
            ingredients: vec!["salt".to_string()],
            instructions: vec!["cook".to_string()],
        }
    }

    #[tokio::test]
    async fn create_then_list_contains_record() -> Result<()> {
        let store = MemoryStore::new();
        let created = store.create(draft("Tacos", &["Mexican"])).await?;
        let listed = store.list().await?;
        assert_eq!(listed, vec![created.clone()]);
        assert_eq!(listed[0].name, "Tacos");
        Ok(())
    }

    #[tokio::test]
    async fn list_keeps_insertion_order() -> Result<()> {
        let store = MemoryStore::new();
        let first = store.create(draft("First", &[])).await?;
        let second = store.create(draft("Second", &[])).await?;
        let third = store.create(draft("Third", &[])).await?;
        store.delete(second.id).await?;
        let ids: Vec<Uuid> = store.list().await?.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first.id, third.id]);
        assert!(first.published_at <= third.published_at);
        Ok(())
    }

    #[tokio::test]
    async fn update_missing_id_does_not_insert() -> Result<()> {
        let store = MemoryStore::new();
        store.create(draft("Tacos", &[])).await?;
        let before = store.list().await?;
        let outcome = store.update(Uuid::new_v4(), draft("Ghost", &[])).await?;
        assert_eq!(outcome, MutationOutcome::NotFound);
        assert_eq!(store.list().await?, before);
        Ok(())
    }

    #[tokio::test]
    async fn update_keeps_id_and_published_at() -> Result<()> {
        let store = MemoryStore::new();
        let created = store.create(draft("Tacos", &["Mexican"])).await?;
        let outcome = store.update(created.id, draft("Burritos", &["Tex-Mex"])).await?;
        assert_eq!(outcome, MutationOutcome::Applied);
        let stored = store.get(created.id).await?;
        let Some(stored) = stored else {
            panic!("updated recipe missing");
        };
        assert_eq!(stored.name, "Burritos");
        assert_eq!(stored.tags, vec!["Tex-Mex".to_string()]);
        assert_eq!(stored.published_at, created.published_at);
        Ok(())
    }

    #[tokio::test]
    async fn second_delete_is_not_found() -> Result<()> {
        let store = MemoryStore::new();
        let created = store.create(draft("Tacos", &[])).await?;
        assert_eq!(store.delete(created.id).await?, MutationOutcome::Applied);
        assert_eq!(store.delete(created.id).await?, MutationOutcome::NotFound);
        Ok(())
    }

    #[tokio::test]
    async fn find_by_tags_reflects_current_contents() -> Result<()> {
        let store = MemoryStore::new();
        let tacos = store.create(draft("Tacos", &["Mexican", "Spicy"])).await?;
        store.create(draft("Pasta", &["Italian"])).await?;

        let query = TagQuery::parse(Some("spicy"));
        assert_eq!(store.find_by_tags(&query).await?, vec![tacos.clone()]);

        store.update(tacos.id, draft("Tacos", &["Mild"])).await?;
        assert!(store.find_by_tags(&query).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_creates_are_not_lost() -> Result<()> {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create(draft(&format!("Recipe {i}"), &[])).await
            }));
        }
        for handle in handles {
            handle.await??;
        }
        assert_eq!(store.count().await?, 32);
        Ok(())
    }

    #[tokio::test]
    async fn users_are_unique() -> Result<()> {
        let store = MemoryStore::new();
        assert_eq!(store.insert_user("admin", "hash").await?, UserOutcome::Created);
        assert_eq!(store.insert_user("admin", "other").await?, UserOutcome::Conflict);
        assert_eq!(store.password_hash("admin").await?.as_deref(), Some("hash"));
        assert_eq!(store.password_hash("nobody").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn sessions_expire_and_delete() -> Result<()> {
        let store = MemoryStore::new();
        store.insert_session(b"live", "admin", 60).await?;
        store.insert_session(b"dead", "admin", -1).await?;

        let live = store.lookup_session(b"live").await?;
        assert_eq!(live.map(|record| record.username).as_deref(), Some("admin"));
        assert!(store.lookup_session(b"dead").await?.is_none());

        store.delete_session(b"live").await?;
        store.delete_session(b"live").await?;
        assert!(store.lookup_session(b"live").await?.is_none());
        Ok(())
    }
}
