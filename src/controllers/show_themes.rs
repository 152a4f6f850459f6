use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::middleware::MaybeUser;
use crate::models::ShowTheme;
use crate::policy::{authorize, Policy};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/show_themes", get(list_themes).post(create_theme))
        .route(
            "/show_themes/{id}",
            get(get_theme).put(update_theme).delete(delete_theme),
        )
}

#[derive(Debug, Deserialize, Validate)]
struct ShowThemePayload {
    #[validate(length(min = 1, max = 200, message = "name must be 1..=200 characters"))]
    name: String,
}

async fn list_themes(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
) -> ApiResult<impl IntoResponse> {
    authorize(Policy::AdminOrReadOnly, user.as_ref(), false)?;
    let themes = ShowTheme::list(&state.db.pool).await?;
    Ok(Json(themes))
}

async fn create_theme(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    Json(payload): Json<ShowThemePayload>,
) -> ApiResult<impl IntoResponse> {
    authorize(Policy::AdminOrReadOnly, user.as_ref(), true)?;
    payload.validate()?;

    let theme = ShowTheme::insert(&state.db.pool, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(theme)))
}

async fn get_theme(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    authorize(Policy::AdminOrReadOnly, user.as_ref(), false)?;
    let theme = ShowTheme::get(&state.db.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("show theme", id))?;
    Ok(Json(theme))
}

async fn update_theme(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    Path(id): Path<i64>,
    Json(payload): Json<ShowThemePayload>,
) -> ApiResult<impl IntoResponse> {
    authorize(Policy::AdminOrReadOnly, user.as_ref(), true)?;
    payload.validate()?;

    let theme = ShowTheme::update(&state.db.pool, id, &payload.name)
        .await?
        .ok_or_else(|| ApiError::not_found("show theme", id))?;
    Ok(Json(theme))
}

async fn delete_theme(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    authorize(Policy::AdminOrReadOnly, user.as_ref(), true)?;

    if !ShowTheme::delete(&state.db.pool, id).await? {
        return Err(ApiError::not_found("show theme", id));
    }
    Ok(StatusCode::NO_CONTENT)
}
