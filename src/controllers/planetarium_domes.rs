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
use crate::models::PlanetariumDome;
use crate::policy::{authorize, Policy};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/planetarium_domes", get(list_domes).post(create_dome))
        .route(
            "/planetarium_domes/{id}",
            get(get_dome).put(update_dome).delete(delete_dome),
        )
}

#[derive(Debug, Deserialize)]
struct DomesQuery {
    name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
struct DomePayload {
    #[validate(length(min = 1, max = 200, message = "name must be 1..=200 characters"))]
    name: String,
    #[validate(range(min = 1, max = 50, message = "rows must be in range 1..=50"))]
    rows: i32,
    #[validate(range(min = 1, max = 100, message = "seats_in_row must be in range 1..=100"))]
    seats_in_row: i32,
}

#[derive(Debug, Serialize)]
struct DomeResponse {
    id: i64,
    name: String,
    rows: i32,
    seats_in_row: i32,
    capacity: i32,
}

impl From<PlanetariumDome> for DomeResponse {
    fn from(dome: PlanetariumDome) -> Self {
        DomeResponse {
            id: dome.id,
            capacity: dome.capacity(),
            name: dome.name,
            rows: dome.rows,
            seats_in_row: dome.seats_in_row,
        }
    }
}

async fn list_domes(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    Query(params): Query<DomesQuery>,
) -> ApiResult<impl IntoResponse> {
    authorize(Policy::AdminOrReadOnly, user.as_ref(), false)?;

    let domes = PlanetariumDome::list(&state.db.pool, params.name.as_deref()).await?;
    let payload: Vec<DomeResponse> = domes.into_iter().map(Into::into).collect();
    Ok(Json(payload))
}

async fn create_dome(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    Json(payload): Json<DomePayload>,
) -> ApiResult<impl IntoResponse> {
    authorize(Policy::AdminOrReadOnly, user.as_ref(), true)?;
    payload.validate()?;

    let dome = PlanetariumDome::insert(
        &state.db.pool,
        &payload.name,
        payload.rows,
        payload.seats_in_row,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DomeResponse::from(dome))))
}

async fn get_dome(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    authorize(Policy::AdminOrReadOnly, user.as_ref(), false)?;

    let dome = PlanetariumDome::get(&state.db.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("planetarium dome", id))?;
    Ok(Json(DomeResponse::from(dome)))
}

async fn update_dome(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    Path(id): Path<i64>,
    Json(payload): Json<DomePayload>,
) -> ApiResult<impl IntoResponse> {
    authorize(Policy::AdminOrReadOnly, user.as_ref(), true)?;
    payload.validate()?;

    let dome = PlanetariumDome::update(
        &state.db.pool,
        id,
        &payload.name,
        payload.rows,
        payload.seats_in_row,
    )
    .await?
    .ok_or_else(|| ApiError::not_found("planetarium dome", id))?;
    Ok(Json(DomeResponse::from(dome)))
}

async fn delete_dome(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    authorize(Policy::AdminOrReadOnly, user.as_ref(), true)?;

    if !PlanetariumDome::delete(&state.db.pool, id).await? {
        return Err(ApiError::not_found("planetarium dome", id));
    }
    Ok(StatusCode::NO_CONTENT)
}
