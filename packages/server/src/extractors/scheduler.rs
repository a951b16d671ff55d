use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::state::AppState;

/// Proof that the request carries the scheduler's shared secret as
/// `Authorization: Bearer <secret>`.
///
/// Add this as a handler parameter to restrict an endpoint to the external
/// scheduler. A missing or wrong secret rejects the whole invocation before
/// any work starts.
pub struct SchedulerAuth;

impl FromRequestParts<AppState> for SchedulerAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::SchedulerUnauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::SchedulerUnauthorized)?;

        if token != state.config.scheduler.secret {
            return Err(AppError::SchedulerUnauthorized);
        }

        Ok(SchedulerAuth)
    }
}
