//! Session verification and role checks.
//!
//! Token issuance belongs to the shared login service; this application
//! only decodes the HS256 session cookie it left behind and enforces the
//! per-route role sets.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use models::Role;

use crate::errors::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "dm_session";

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Email address of the signed-in staff user.
    pub sub: String,
    pub name: String,
    pub role: String,
    pub exp: usize,
}

/// The signed-in staff user, decoded from the session cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub email: String,
    pub name: String,
    pub role: Role,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or(AppError::Unauthorized)?;

        let key = DecodingKey::from_secret(state.session_secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let data = decode::<SessionClaims>(&token, &key, &validation).map_err(|e| {
            tracing::warn!(error = %e, "session token rejected");
            AppError::Unauthorized
        })?;
        let role: Role = data
            .claims
            .role
            .parse()
            .map_err(|_| AppError::Unauthorized)?;
        Ok(CurrentUser {
            email: data.claims.sub,
            name: data.claims.name,
            role,
        })
    }
}

/// Gate a handler on the allowed role set.
pub fn require_any(user: &CurrentUser, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_gate() {
        let user = CurrentUser {
            email: "test@example.com".into(),
            name: "Test".into(),
            role: Role::AdminCcsCategory,
        };
        assert!(require_any(&user, &[Role::Admin, Role::AdminCcsCategory]).is_ok());
        assert!(matches!(
            require_any(&user, &[Role::AdminManager]),
            Err(AppError::Forbidden)
        ));
    }
}
