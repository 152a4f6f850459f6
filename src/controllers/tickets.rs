use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::controllers::show_sessions::SessionListResponse;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::show_session::ShowSessionRow;
use crate::models::TicketRow;
use crate::services::booking::{book_seat, PgBookingStore, SeatRequest};
use crate::services::notifier::Notifier;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tickets", get(list_tickets).post(create_ticket))
        .route("/tickets/{id}", get(get_ticket).delete(delete_ticket))
}

#[derive(Debug, Deserialize)]
struct TicketsQuery {
    show_title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TicketPayload {
    row: i32,
    seat: i32,
    show_session: i64,
    /// Omitted: a fresh reservation is created alongside the ticket.
    reservation: Option<i64>,
}

#[derive(Debug, Serialize)]
struct TicketSessionSummary {
    show_title: String,
    planetarium_dome: String,
}

/// List shape: session collapsed to show title + dome name, reservation to
/// its creation timestamp.
#[derive(Debug, Serialize)]
struct TicketListResponse {
    id: i64,
    row: i32,
    seat: i32,
    show_session: TicketSessionSummary,
    reservation: String,
}

impl From<&TicketRow> for TicketListResponse {
    fn from(ticket: &TicketRow) -> Self {
        TicketListResponse {
            id: ticket.id,
            row: ticket.row,
            seat: ticket.seat,
            show_session: TicketSessionSummary {
                show_title: ticket.show_title.clone(),
                planetarium_dome: ticket.dome_name.clone(),
            },
            reservation: ticket.reservation_label(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TicketReservationDetail {
    id: i64,
    user: i64,
    created_at: String,
}

/// Detail shape: the full session summary is expanded inline.
#[derive(Debug, Serialize)]
struct TicketDetailResponse {
    id: i64,
    row: i32,
    seat: i32,
    show_session: SessionListResponse,
    reservation: TicketReservationDetail,
}

#[derive(Debug, Serialize)]
struct TicketCreatedResponse {
    id: i64,
    row: i32,
    seat: i32,
    show_session: i64,
    reservation: i64,
}

async fn list_tickets(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(params): Query<TicketsQuery>,
) -> ApiResult<impl IntoResponse> {
    let tickets =
        TicketRow::list_for_user(&state.db.pool, user.id, params.show_title.as_deref()).await?;
    let payload: Vec<TicketListResponse> =
        tickets.iter().map(TicketListResponse::from).collect();
    Ok(Json(payload))
}

async fn create_ticket(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<TicketPayload>,
) -> ApiResult<impl IntoResponse> {
    let store = PgBookingStore::new(state.db.pool.clone());
    let request = SeatRequest {
        show_session_id: payload.show_session,
        row: payload.row,
        seat: payload.seat,
        reservation_id: payload.reservation,
    };

    let booked = book_seat(&store, user.id, &request).await?;

    // The ticket is committed; the notification must not affect the outcome.
    if let Ok(Some(ticket)) =
        TicketRow::get_for_user(&state.db.pool, booked.ticket_id, user.id).await
    {
        let message = Notifier::ticket_created_message(
            &user.email,
            &ticket.show_title,
            ticket.row,
            ticket.seat,
            ticket.show_time,
        );
        state.notifier.notify(message);
    }

    Ok((
        StatusCode::CREATED,
        Json(TicketCreatedResponse {
            id: booked.ticket_id,
            row: payload.row,
            seat: payload.seat,
            show_session: payload.show_session,
            reservation: booked.reservation_id,
        }),
    ))
}

async fn get_ticket(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let ticket = TicketRow::get_for_user(&state.db.pool, id, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("ticket", id))?;

    let session = ShowSessionRow::get(&state.db.pool, ticket.show_session_id)
        .await?
        .ok_or_else(|| ApiError::not_found("show session", ticket.show_session_id))?;

    Ok(Json(TicketDetailResponse {
        id: ticket.id,
        row: ticket.row,
        seat: ticket.seat,
        show_session: SessionListResponse::from_row(&session),
        reservation: TicketReservationDetail {
            id: ticket.reservation_id,
            user: ticket.user_id,
            created_at: ticket.reservation_label(),
        },
    }))
}

async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    if !TicketRow::delete_for_user(&state.db.pool, id, user.id).await? {
        return Err(ApiError::not_found("ticket", id));
    }
    Ok(StatusCode::NO_CONTENT)
}
