//! Access-token validation. Tokens are minted by the CRUD application with
//! the shared `JWT_SECRET`; this service only verifies them.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id (`usr_…`).
    pub id: String,
    pub role: String,
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
}

/// Validate an HS256 access token and return its claims.
///
/// Signature and `exp` are checked; every failure collapses into the
/// authentication error, with the cause kept to the logs.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, GatewayError> {
    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| {
        tracing::debug!(?e, "token validation failed");
        GatewayError::unauthenticated("Invalid authentication token")
    })?;

    Ok(data.claims)
}
