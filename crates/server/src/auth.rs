//! Bearer-token authentication.
//!
//! Every protected route runs [`auth`] first: it reads the
//! `Authorization: Bearer <token>` header, asks the configured
//! [`IdentityVerifier`] for the subject and stores it as a [`CurrentUser`]
//! request extension.

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use thiserror::Error;

use crate::{Error, server::ServerState};

/// The verified caller, available to handlers as `Extension<CurrentUser>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing or invalid authorization header")]
    MissingHeader,
    #[error("invalid token")]
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(Error {
            error: self.to_string(),
        });
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Turns a bearer credential into a stable user identifier.
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<String, AuthError>;
}

#[derive(Deserialize)]
struct Claims {
    sub: String,
}

/// Verifies HS256-signed JWTs and yields their `sub` claim.
///
/// `exp` is mandatory and checked.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl IdentityVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|err| {
            tracing::debug!("token rejected: {err}");
            AuthError::InvalidToken
        })?;
        if data.claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }
        Ok(data.claims.sub)
    }
}

pub(crate) async fn auth(
    State(state): State<ServerState>,
    auth_header: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let TypedHeader(Authorization(bearer)) = auth_header.map_err(|_| AuthError::MissingHeader)?;
    let id = state.verifier.verify(bearer.token())?;

    request.extensions_mut().insert(CurrentUser { id });
    Ok(next.run(request).await)
}
