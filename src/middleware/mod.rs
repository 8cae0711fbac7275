use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{header, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::error::BookingError;
use crate::models::SessionUser;

/// Claims сессионного токена, который выдаёт auth-сервис.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub username: String,
    pub email: String,
    pub exp: usize,
}

/// Пользователь текущего запроса. Без валидной сессии защищённые
/// обработчики не вызываются вовсе.
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionUser);

pub fn sign_in_url(auth: &AuthConfig, callback: &str) -> String {
    let query = serde_urlencoded::to_string([("callbackUrl", callback)]).unwrap_or_default();
    format!("{}?{}", auth.sign_in_path, query)
}

pub fn verify_session(token: &str, secret: &str) -> Result<SessionUser, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<SessionClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)?;
    Ok(SessionUser {
        id: data.claims.sub,
        username: data.claims.username,
        email: data.claims.email,
    })
}

// Bearer JWT extractor
impl FromRequestParts<Arc<crate::AppState>> for AuthUser {
    type Rejection = BookingError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        // Внутри nest("/api") uri уже без префикса
        let callback = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| original.0.path().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());
        let unauthorized = || BookingError::Unauthorized {
            sign_in_url: sign_in_url(&state.config.auth, &callback),
        };

        // Получаем заголовок Authorization
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(unauthorized)?;

        let user = verify_session(token.trim(), &state.config.auth.session_secret).map_err(|e| {
            tracing::debug!("Rejected session token: {}", e);
            unauthorized()
        })?;

        Ok(AuthUser(user))
    }
}
