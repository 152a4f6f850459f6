use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::User;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/me", get(me))
}

#[derive(Debug, Deserialize, Validate)]
struct RegisterPayload {
    #[validate(email(message = "email must be a valid address"))]
    email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    password: String,
}

#[derive(Debug, Serialize)]
struct UserResponse {
    id: i64,
    email: String,
    is_staff: bool,
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterPayload>,
) -> ApiResult<impl IntoResponse> {
    payload.validate()?;

    let password_hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST)
        .map_err(|err| ApiError::Internal(format!("password hashing failed: {err}")))?;

    let user = User::insert(&state.db.pool, &payload.email, &password_hash).await?;
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user.id,
            email: user.email,
            is_staff: user.is_staff,
        }),
    ))
}

async fn me(user: AuthUser) -> ApiResult<impl IntoResponse> {
    Ok(Json(UserResponse {
        id: user.id,
        email: user.email,
        is_staff: user.is_staff,
    }))
}
