use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::middleware::{AuthUser, MaybeUser};
use crate::models::show_session::{SessionOrdering, ShowSessionRow};
use crate::models::{AstronomyShowRow, PlanetariumDome};
use crate::policy::{authorize, Policy};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/show_sessions", get(list_sessions).post(create_session))
        .route("/show_sessions/nearest_show", get(nearest_show))
        .route(
            "/show_sessions/{id}",
            get(get_session).put(update_session).delete(delete_session),
        )
}

#[derive(Debug, Deserialize)]
struct SessionsQuery {
    ordering: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionPayload {
    astronomy_show: i64,
    planetarium_dome: i64,
    show_time: String,
}

#[derive(Debug, Serialize)]
struct SessionShowSummary {
    id: i64,
    title: String,
    show_theme: Option<String>,
}

#[derive(Debug, Serialize)]
struct SessionDomeSummary {
    name: String,
    capacity: i64,
}

/// List shape: related entities summarized, date-only show_time.
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    id: i64,
    astronomy_show: SessionShowSummary,
    planetarium_dome: SessionDomeSummary,
    show_time: String,
    tickets_available: i64,
}

impl SessionListResponse {
    pub fn from_row(row: &ShowSessionRow) -> Self {
        SessionListResponse {
            id: row.id,
            astronomy_show: SessionShowSummary {
                id: row.astronomy_show_id,
                title: row.show_title.clone(),
                show_theme: row.show_theme.clone(),
            },
            planetarium_dome: SessionDomeSummary {
                name: row.dome_name.clone(),
                capacity: row.dome_capacity(),
            },
            show_time: row.show_time.format("%Y-%m-%d").to_string(),
            tickets_available: row.tickets_available,
        }
    }
}

#[derive(Debug, Serialize)]
struct SessionShowDetail {
    id: i64,
    title: String,
    show_theme: Option<String>,
    description: String,
}

#[derive(Debug, Serialize)]
struct SessionDomeDetail {
    id: i64,
    name: String,
    rows: i32,
    seats_in_row: i32,
    capacity: i64,
}

/// Detail shape: fully expanded show and dome, minute-precision show_time.
#[derive(Debug, Serialize)]
struct SessionDetailResponse {
    id: i64,
    astronomy_show: SessionShowDetail,
    planetarium_dome: SessionDomeDetail,
    show_time: String,
    tickets_available: i64,
}

impl SessionDetailResponse {
    fn from_row(row: &ShowSessionRow) -> Self {
        SessionDetailResponse {
            id: row.id,
            astronomy_show: SessionShowDetail {
                id: row.astronomy_show_id,
                title: row.show_title.clone(),
                show_theme: row.show_theme.clone(),
                description: row.show_description.clone(),
            },
            planetarium_dome: SessionDomeDetail {
                id: row.dome_id,
                name: row.dome_name.clone(),
                rows: row.dome_rows,
                seats_in_row: row.dome_seats_in_row,
                capacity: row.dome_capacity(),
            },
            show_time: row.show_time.format("%Y-%m-%d, %H:%M").to_string(),
            tickets_available: row.tickets_available,
        }
    }
}

fn parse_ordering(ordering: Option<&str>) -> ApiResult<SessionOrdering> {
    match ordering {
        None | Some("-show_time") => Ok(SessionOrdering::ShowTimeDesc),
        Some("show_time") => Ok(SessionOrdering::ShowTimeAsc),
        Some(other) => Err(ApiError::Validation(format!(
            "unsupported ordering '{other}', expected show_time or -show_time"
        ))),
    }
}

fn parse_show_time(value: &str) -> ApiResult<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| {
            ApiError::Validation(format!(
                "show_time '{value}' is not a valid datetime (expected YYYY-MM-DD HH:MM[:SS])"
            ))
        })
}

async fn check_refs_exist(state: &AppState, payload: &SessionPayload) -> ApiResult<()> {
    if AstronomyShowRow::get(&state.db.pool, payload.astronomy_show)
        .await?
        .is_none()
    {
        return Err(ApiError::Validation(format!(
            "astronomy show {} does not exist",
            payload.astronomy_show
        )));
    }
    if PlanetariumDome::get(&state.db.pool, payload.planetarium_dome)
        .await?
        .is_none()
    {
        return Err(ApiError::Validation(format!(
            "planetarium dome {} does not exist",
            payload.planetarium_dome
        )));
    }
    Ok(())
}

async fn list_sessions(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    Query(params): Query<SessionsQuery>,
) -> ApiResult<impl IntoResponse> {
    authorize(Policy::AuthorizedOrReadOnly, user.as_ref(), false)?;

    let ordering = parse_ordering(params.ordering.as_deref())?;
    let sessions = ShowSessionRow::list(&state.db.pool, ordering).await?;
    let payload: Vec<SessionListResponse> = sessions
        .iter()
        .map(SessionListResponse::from_row)
        .collect();
    Ok(Json(payload))
}

async fn create_session(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    Json(payload): Json<SessionPayload>,
) -> ApiResult<impl IntoResponse> {
    authorize(Policy::AuthorizedOrReadOnly, user.as_ref(), true)?;

    let show_time = parse_show_time(&payload.show_time)?;
    check_refs_exist(&state, &payload).await?;

    let session = ShowSessionRow::insert(
        &state.db.pool,
        payload.astronomy_show,
        payload.planetarium_dome,
        show_time,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionDetailResponse::from_row(&session)),
    ))
}

/// Earliest upcoming session for the authenticated caller.
async fn nearest_show(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let session = ShowSessionRow::nearest(&state.db.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("No upcoming shows found.".to_string()))?;
    Ok(Json(SessionDetailResponse::from_row(&session)))
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    authorize(Policy::AuthorizedOrReadOnly, user.as_ref(), false)?;

    let session = ShowSessionRow::get(&state.db.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("show session", id))?;
    Ok(Json(SessionDetailResponse::from_row(&session)))
}

async fn update_session(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    Path(id): Path<i64>,
    Json(payload): Json<SessionPayload>,
) -> ApiResult<impl IntoResponse> {
    authorize(Policy::AuthorizedOrReadOnly, user.as_ref(), true)?;

    let show_time = parse_show_time(&payload.show_time)?;
    check_refs_exist(&state, &payload).await?;

    let session = ShowSessionRow::update(
        &state.db.pool,
        id,
        payload.astronomy_show,
        payload.planetarium_dome,
        show_time,
    )
    .await?
    .ok_or_else(|| ApiError::not_found("show session", id))?;
    Ok(Json(SessionDetailResponse::from_row(&session)))
}

async fn delete_session(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    authorize(Policy::AuthorizedOrReadOnly, user.as_ref(), true)?;

    if !ShowSessionRow::delete_with_tickets(&state.db.pool, id).await? {
        return Err(ApiError::not_found("show session", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_time_accepts_common_formats() {
        for value in [
            "2024-08-08T15:00:00",
            "2024-08-08 15:00:00",
            "2024-08-08T15:00",
            "2024-08-08 15:00",
        ] {
            let parsed = parse_show_time(value).unwrap();
            assert_eq!(parsed.format("%Y-%m-%d %H:%M").to_string(), "2024-08-08 15:00");
        }
    }

    #[test]
    fn bad_show_time_is_a_validation_error() {
        let err = parse_show_time("next tuesday").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn ordering_param_is_restricted() {
        assert_eq!(parse_ordering(None).unwrap(), SessionOrdering::ShowTimeDesc);
        assert_eq!(
            parse_ordering(Some("show_time")).unwrap(),
            SessionOrdering::ShowTimeAsc
        );
        assert_eq!(
            parse_ordering(Some("-show_time")).unwrap(),
            SessionOrdering::ShowTimeDesc
        );
        assert!(parse_ordering(Some("id")).is_err());
    }
}
