//! `POST /api/account/register` and `POST /api/account/authenticate`.

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;
use uuid::Uuid;

use crate::auth::hash_password;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::models::{Authenticate, AuthenticatedUser, Register, User};
use crate::AppState;

const MIN_PASSWORD_LEN: usize = 6;

pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<Register>,
) -> Result<(StatusCode, Json<Envelope<Uuid>>), ApiError> {
    let email = input.email.trim().to_string();
    if !email.contains('@') {
        return Err(ApiError::Validation(format!("{email} is not a valid email address")));
    }
    if input.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if !state.users.is_unique_email(&email).await {
        return Err(ApiError::DuplicateEmail(email));
    }

    let id = Uuid::new_v4();
    let user = User {
        id,
        first_name: input.first_name,
        last_name: input.last_name,
        password_hash: hash_password(id, &input.password),
        email,
    };
    let user = state.users.add(user).await;
    info!(user_id = %user.id, "account registered");
    Ok((StatusCode::CREATED, Json(Envelope::ok(user.id))))
}

pub async fn authenticate(
    State(state): State<AppState>,
    Json(input): Json<Authenticate>,
) -> Result<Json<Envelope<AuthenticatedUser>>, ApiError> {
    let email = input.email.trim();
    let user = state
        .users
        .find_by_email(email)
        .await
        .filter(|u| u.password_hash == hash_password(u.id, &input.password))
        .ok_or_else(|| ApiError::InvalidCredentials(email.to_string()))?;

    let token = state.tokens.issue(user.id).await;
    info!(user_id = %user.id, "session issued");
    Ok(Json(Envelope::ok(AuthenticatedUser {
        id: user.id,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        token,
    })))
}
