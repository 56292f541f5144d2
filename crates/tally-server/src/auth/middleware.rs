use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use subtle::ConstantTimeEq;

use crate::{error::AppError, state::AppState};

use super::password::verify_password;

/// Require HTTP Basic credentials matching the configured admin account.
///
/// The username is compared in constant time; the password is checked
/// against the Argon2 hash on the blocking pool since verification is
/// deliberately expensive.
pub async fn require_basic_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let credentials = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(parse_basic_credentials);

    let Some((username, password)) = credentials else {
        return AppError::Unauthorized.into_response();
    };

    let username_ok: bool = username
        .as_bytes()
        .ct_eq(state.config.admin_username.as_bytes())
        .into();

    let hash = state.config.admin_password_hash.clone();
    let password_ok = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "password verification task failed");
            false
        });

    if username_ok && password_ok {
        next.run(request).await
    } else {
        tracing::warn!("stats access denied: bad credentials");
        AppError::Unauthorized.into_response()
    }
}

/// Decode an `Authorization: Basic <base64(user:pass)>` header value.
pub fn parse_basic_credentials(value: &str) -> Option<(String, String)> {
    let encoded = value.strip_prefix("Basic ")?.trim();
    let decoded = STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}
