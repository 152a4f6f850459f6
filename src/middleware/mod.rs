use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use base64::{engine::general_purpose, Engine as _};
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::User;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub is_staff: bool,
}

/// Optional authentication: resolves to `None` when no Authorization header
/// is present, but still rejects credentials that are present and wrong.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthUser>);

async fn authenticate(
    parts: &Parts,
    state: &Arc<crate::AppState>,
) -> Result<AuthUser, ApiError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthenticated)?;

    let encoded = auth_header
        .strip_prefix("Basic ")
        .ok_or(ApiError::Unauthenticated)?;

    let decoded = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| ApiError::Unauthenticated)?;

    let credentials = String::from_utf8(decoded).map_err(|_| ApiError::Unauthenticated)?;

    let mut credentials = credentials.splitn(2, ':');
    let email = credentials.next().ok_or(ApiError::Unauthenticated)?;
    let password = credentials.next().ok_or(ApiError::Unauthenticated)?;

    let user = User::find_by_email(&state.db.pool, email)
        .await?
        .filter(|user| user.is_active)
        .ok_or(ApiError::Unauthenticated)?;

    if !user.verify_password(password) {
        return Err(ApiError::Unauthenticated);
    }

    Ok(AuthUser {
        id: user.id,
        email: user.email,
        is_staff: user.is_staff,
    })
}

impl FromRequestParts<Arc<crate::AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).await
    }
}

impl FromRequestParts<Arc<crate::AppState>> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(header::AUTHORIZATION) {
            return Ok(MaybeUser(None));
        }
        let user = authenticate(parts, state).await?;
        Ok(MaybeUser(Some(user)))
    }
}

impl MaybeUser {
    pub fn as_ref(&self) -> Option<&AuthUser> {
        self.0.as_ref()
    }
}
