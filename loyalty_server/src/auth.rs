use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::trace;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

pub const AUTH_COOKIE_NAME: &str = "auth_token";
const BEARER_PREFIX: &str = "Bearer ";

/// The claims carried by an access token. `sub` is the user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: i64,
    pub iat: i64,
    pub exp: i64,
}

impl JwtClaims {
    pub fn user_id(&self) -> i64 {
        self.sub
    }
}

/// Signs and validates access tokens (HS256). One instance is shared through the app data; the
/// [`JwtClaims`] extractor picks it up from there.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry: chrono::Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.reveal().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            expiry: config.token_expiry,
        }
    }

    /// Issue a new access token for the given user. Authentication must have happened before this call.
    pub fn issue_token(&self, user_id: i64) -> Result<String, ServerError> {
        let now = Utc::now();
        let claims = JwtClaims { sub: user_id, iat: now.timestamp(), exp: (now + self.expiry).timestamp() };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ServerError::Unspecified(format!("Could not sign access token. {e}")))
    }

    pub fn validate_token(&self, token: &str) -> Result<JwtClaims, AuthError> {
        decode::<JwtClaims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

/// Authenticated routes simply take `claims: JwtClaims` as a handler argument; requests without a valid token are
/// rejected with 401 before the handler body runs.
impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req))
    }
}

fn claims_from_request(req: &HttpRequest) -> Result<JwtClaims, ServerError> {
    let issuer = req
        .app_data::<web::Data<TokenIssuer>>()
        .ok_or_else(|| ServerError::InitializeError("TokenIssuer is not configured".to_string()))?;
    let token = extract_token(req).ok_or(AuthError::MissingToken)?;
    let claims = issuer.validate_token(&token)?;
    trace!("💻️ Request authenticated for user #{}", claims.sub);
    Ok(claims)
}

/// The token is taken from the `Authorization: Bearer` header first, then from the auth cookie.
fn extract_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(|s| s.to_string())
        .or_else(|| req.cookie(AUTH_COOKIE_NAME).map(|c| c.value().to_string()))
}
