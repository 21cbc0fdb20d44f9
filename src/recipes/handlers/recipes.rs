//! Recipe endpoints.

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    Json,
};
use serde::Deserialize;
use tracing::{debug, info, info_span, instrument};
use utoipa::IntoParams;
use uuid::Uuid;

use super::auth::{MessageResponse, Session};
use crate::recipes::{
    error::{ApiError, ErrorResponse},
    store::{MutationOutcome, Recipe, RecipeDraft, SharedRecipeStore, TagQuery},
};

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Tags separated by `;`, matched case-insensitively.
    pub tag: Option<String>,
}

fn validate_draft(
    payload: Result<Json<RecipeDraft>, JsonRejection>,
) -> Result<RecipeDraft, ApiError> {
    let Json(draft) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    if draft.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".to_string()));
    }
    Ok(draft)
}

/// Path ids are opaque to clients; anything that is not a UUID cannot exist.
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}

#[utoipa::path(
    get,
    path = "/recipes",
    responses(
        (status = 200, description = "All recipes", body = [Recipe]),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "recipes"
)]
#[instrument(name = "recipes.list", skip_all)]
pub async fn list(
    Extension(recipes): Extension<SharedRecipeStore>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    let all = recipes.list().await?;
    Ok(info_span!("respond").in_scope(|| Json(all)))
}

#[utoipa::path(
    get,
    path = "/recipes/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Recipes sharing at least one tag", body = [Recipe]),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "recipes"
)]
#[instrument(name = "recipes.search", skip_all)]
pub async fn search(
    Extension(recipes): Extension<SharedRecipeStore>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    let query = info_span!("validate").in_scope(|| TagQuery::parse(params.tag.as_deref()));
    if query.is_empty() {
        debug!("Empty tag query");
        return Ok(Json(Vec::new()));
    }

    let found = recipes.find_by_tags(&query).await?;
    Ok(info_span!("respond").in_scope(|| Json(found)))
}

#[utoipa::path(
    post,
    path = "/recipes",
    request_body = RecipeDraft,
    responses(
        (status = 200, description = "Recipe created", body = Recipe),
        (status = 400, description = "Malformed recipe", body = ErrorResponse),
        (status = 403, description = "Not logged in", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "recipes"
)]
#[instrument(name = "recipes.create", skip_all)]
pub async fn create(
    Extension(recipes): Extension<SharedRecipeStore>,
    session: Session,
    payload: Result<Json<RecipeDraft>, JsonRejection>,
) -> Result<Json<Recipe>, ApiError> {
    let draft = info_span!("validate").in_scope(|| validate_draft(payload))?;
    let recipe = recipes.create(draft).await?;
    Ok(info_span!("respond").in_scope(|| {
        info!("Recipe {} created by {}", recipe.id, session.username);
        Json(recipe)
    }))
}

#[utoipa::path(
    put,
    path = "/recipes/{id}",
    params(("id" = String, Path, description = "Recipe id")),
    request_body = RecipeDraft,
    responses(
        (status = 200, description = "Recipe updated", body = MessageResponse),
        (status = 400, description = "Malformed recipe", body = ErrorResponse),
        (status = 403, description = "Not logged in", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "recipes"
)]
#[instrument(name = "recipes.update", skip_all)]
pub async fn update(
    Extension(recipes): Extension<SharedRecipeStore>,
    session: Session,
    Path(id): Path<String>,
    payload: Result<Json<RecipeDraft>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (id, draft) = info_span!("validate").in_scope(|| {
        let draft = validate_draft(payload)?;
        Ok::<_, ApiError>((parse_id(&id)?, draft))
    })?;

    match recipes.update(id, draft).await? {
        MutationOutcome::Applied => Ok(info_span!("respond").in_scope(|| {
            info!("Recipe {} updated by {}", id, session.username);
            Json(MessageResponse::new("Recipe has been updated"))
        })),
        MutationOutcome::NotFound => Err(ApiError::NotFound),
    }
}

#[utoipa::path(
    delete,
    path = "/recipes/{id}",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe deleted", body = MessageResponse),
        (status = 403, description = "Not logged in", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [])),
    tag = "recipes"
)]
#[instrument(name = "recipes.delete", skip_all)]
pub async fn delete(
    Extension(recipes): Extension<SharedRecipeStore>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = info_span!("validate").in_scope(|| parse_id(&id))?;

    match recipes.delete(id).await? {
        MutationOutcome::Applied => Ok(info_span!("respond").in_scope(|| {
            info!("Recipe {} deleted by {}", id, session.username);
            Json(MessageResponse::new("Recipe has been deleted"))
        })),
        MutationOutcome::NotFound => Err(ApiError::NotFound),
    }
}
