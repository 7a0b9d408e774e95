//! Bearer-token authentication extractor

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::Serialize;
use std::sync::Arc;

use crate::auth::{verify_token, AuthService, TokenKind};
use crate::models::AuthMethod;

/// The verified identity behind an access token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub principal: String,
    pub method: AuthMethod,
}

/// 401 response body for extractor rejections
#[derive(Debug, Serialize)]
struct AuthRejection {
    error: AuthRejectionDetails,
}

#[derive(Debug, Serialize)]
struct AuthRejectionDetails {
    code: String,
    message: String,
}

impl AuthRejection {
    fn new(code: &str, message: &str) -> Response {
        let body = Self {
            error: AuthRejectionDetails {
                code: code.to_string(),
                message: message.to_string(),
            },
        };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    AuthRejection::new(
                        "MISSING_TOKEN",
                        "Authorization header with Bearer token required",
                    )
                })?;

        let auth_service = Arc::<AuthService>::from_ref(state);

        let claims = verify_token(bearer.token(), auth_service.jwt_secret())
            .map_err(|_| AuthRejection::new("INVALID_TOKEN", "Invalid or expired token"))?;

        if claims.kind != TokenKind::Access {
            return Err(AuthRejection::new(
                "INVALID_TOKEN_TYPE",
                "Expected access token",
            ));
        }

        Ok(AuthenticatedUser {
            principal: claims.sub,
            method: claims.method,
        })
    }
}
