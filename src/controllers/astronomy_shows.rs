use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::middleware::MaybeUser;
use crate::models::astronomy_show::{AstronomyShowRow, ShowFilter};
use crate::models::ShowTheme;
use crate::policy::{authorize, Policy};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/astronomy_shows", get(list_shows).post(create_show))
        .route(
            "/astronomy_shows/{id}",
            get(get_show).put(update_show).delete(delete_show),
        )
}

#[derive(Debug, Deserialize)]
struct ShowsQuery {
    title: Option<String>,
    show_theme: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
struct AstronomyShowPayload {
    #[validate(length(min = 1, max = 200, message = "title must be 1..=200 characters"))]
    title: String,
    #[serde(default)]
    description: String,
    show_theme: Option<i64>,
}

/// Summary shape: theme flattened to its name.
#[derive(Debug, Serialize)]
struct ShowListResponse {
    id: i64,
    title: String,
    show_theme: Option<String>,
}

/// Detail shape: summary plus the description.
#[derive(Debug, Serialize)]
struct ShowDetailResponse {
    id: i64,
    title: String,
    show_theme: Option<String>,
    description: String,
}

impl From<AstronomyShowRow> for ShowListResponse {
    fn from(row: AstronomyShowRow) -> Self {
        ShowListResponse {
            id: row.id,
            title: row.title,
            show_theme: row.show_theme,
        }
    }
}

impl From<AstronomyShowRow> for ShowDetailResponse {
    fn from(row: AstronomyShowRow) -> Self {
        ShowDetailResponse {
            id: row.id,
            title: row.title,
            show_theme: row.show_theme,
            description: row.description,
        }
    }
}

async fn check_theme_exists(state: &AppState, show_theme: Option<i64>) -> ApiResult<()> {
    if let Some(theme_id) = show_theme {
        if ShowTheme::get(&state.db.pool, theme_id).await?.is_none() {
            return Err(ApiError::Validation(format!(
                "show theme {theme_id} does not exist"
            )));
        }
    }
    Ok(())
}

async fn list_shows(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    Query(params): Query<ShowsQuery>,
) -> ApiResult<impl IntoResponse> {
    authorize(Policy::AdminOrReadOnly, user.as_ref(), false)?;

    let filter = ShowFilter {
        title: params.title,
        show_theme: params.show_theme,
    };
    let shows = AstronomyShowRow::list(&state.db.pool, &filter).await?;
    let payload: Vec<ShowListResponse> = shows.into_iter().map(Into::into).collect();
    Ok(Json(payload))
}

async fn create_show(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    Json(payload): Json<AstronomyShowPayload>,
) -> ApiResult<impl IntoResponse> {
    authorize(Policy::AdminOrReadOnly, user.as_ref(), true)?;
    payload.validate()?;
    check_theme_exists(&state, payload.show_theme).await?;

    let show = AstronomyShowRow::insert(
        &state.db.pool,
        &payload.title,
        &payload.description,
        payload.show_theme,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(ShowDetailResponse::from(show))))
}

async fn get_show(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    authorize(Policy::AdminOrReadOnly, user.as_ref(), false)?;

    let show = AstronomyShowRow::get(&state.db.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("astronomy show", id))?;
    Ok(Json(ShowDetailResponse::from(show)))
}

async fn update_show(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    Path(id): Path<i64>,
    Json(payload): Json<AstronomyShowPayload>,
) -> ApiResult<impl IntoResponse> {
    authorize(Policy::AdminOrReadOnly, user.as_ref(), true)?;
    payload.validate()?;
    check_theme_exists(&state, payload.show_theme).await?;

    let show = AstronomyShowRow::update(
        &state.db.pool,
        id,
        &payload.title,
        &payload.description,
        payload.show_theme,
    )
    .await?
    .ok_or_else(|| ApiError::not_found("astronomy show", id))?;
    Ok(Json(ShowDetailResponse::from(show)))
}

async fn delete_show(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    authorize(Policy::AdminOrReadOnly, user.as_ref(), true)?;

    if !AstronomyShowRow::delete(&state.db.pool, id).await? {
        return Err(ApiError::not_found("astronomy show", id));
    }
    Ok(StatusCode::NO_CONTENT)
}
