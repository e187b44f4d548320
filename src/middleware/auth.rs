use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::access::{Identity, Role};
use crate::auth::Claims;
use crate::config;
use crate::error::ApiError;

/// Authenticated account context extracted from a verified JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.role)
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }
}

/// The request's identity, if any. Anonymous requests flow through; the
/// scoping engine denies them wherever an identity is required.
#[derive(Clone, Debug, Default)]
pub struct CurrentIdentity(pub Option<AuthUser>);

impl CurrentIdentity {
    pub fn identity(&self) -> Option<Identity> {
        self.0.as_ref().map(AuthUser::identity)
    }
}

/// Identity middleware: a missing Authorization header leaves the request
/// anonymous; a present-but-invalid token is rejected outright.
pub async fn identity_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let current = match extract_bearer(&headers).map_err(ApiError::unauthorized)? {
        None => CurrentIdentity(None),
        Some(token) => {
            let claims = validate_jwt(&token).map_err(ApiError::unauthorized)?;
            CurrentIdentity(Some(AuthUser::from(claims)))
        }
    };

    request.extensions_mut().insert(current);
    Ok(next.run(request).await)
}

/// Extract the bearer token, distinguishing "no header" (anonymous) from a
/// malformed one (rejected).
fn extract_bearer(headers: &HeaderMap) -> Result<Option<String>, String> {
    let Some(auth_header) = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
    else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(Some(token.to_string()))
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

/// Validate JWT token and extract claims
fn validate_jwt(token: &str) -> Result<Claims, String> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err("JWT secret not configured".to_string());
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| format!("Invalid JWT token: {}", e))?;

    Ok(token_data.claims)
}
