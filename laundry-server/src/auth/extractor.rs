//! JWT Extractor
//!
//! Validates the Bearer token and yields [`CurrentUser`]. When a stored
//! profile exists its role wins over the role claim.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = match auth_header {
            Some(header) => JwtService::extract_from_header(header)
                .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
            None => {
                security_log!(WARN, "auth_missing", uri = %parts.uri);
                return Err(AppError::not_authenticated());
            }
        };

        let claims = match state.jwt_service.validate_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                security_log!(WARN, "auth_failed", error = %e, uri = %parts.uri);
                return Err(match e {
                    JwtError::ExpiredToken => AppError::token_expired(),
                    _ => AppError::invalid_token("Invalid token"),
                });
            }
        };

        let mut user = CurrentUser::from(claims);
        match state.catalog.get_user(&user.id) {
            Ok(Some(profile)) => user.role = profile.role,
            Ok(None) => {}
            Err(e) => return Err(e.into()),
        }

        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
