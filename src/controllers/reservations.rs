use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::Reservation;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reservations", get(list_reservations).post(create_reservation))
        .route(
            "/reservations/{id}",
            get(get_reservation).delete(delete_reservation),
        )
}

#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    pub id: i64,
    pub user: i64,
    pub created_at: String,
}

impl From<&Reservation> for ReservationResponse {
    fn from(reservation: &Reservation) -> Self {
        ReservationResponse {
            id: reservation.id,
            user: reservation.user_id,
            created_at: reservation.formatted_created_at(),
        }
    }
}

// The AuthUser extractor alone enforces the Authorized policy here: every
// route requires credentials, and all queries are scoped to the caller.

async fn list_reservations(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let reservations = Reservation::list_for_user(&state.db.pool, user.id).await?;
    let payload: Vec<ReservationResponse> =
        reservations.iter().map(ReservationResponse::from).collect();
    Ok(Json(payload))
}

async fn create_reservation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let reservation = Reservation::insert(&state.db.pool, user.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ReservationResponse::from(&reservation)),
    ))
}

async fn get_reservation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let reservation = Reservation::get_for_user(&state.db.pool, id, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("reservation", id))?;
    Ok(Json(ReservationResponse::from(&reservation)))
}

async fn delete_reservation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    if !Reservation::delete_with_tickets(&state.db.pool, id, user.id).await? {
        return Err(ApiError::not_found("reservation", id));
    }
    Ok(StatusCode::NO_CONTENT)
}
