use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::{
    CatalogState,
    config::{AppConfig, Env},
    models::UserInfo,
};

/// IdentityAccessor
///
/// Answers "who is this session running as?". An empty `user_id` in the
/// returned record means nobody is signed in.
pub trait IdentityAccessor: Send + Sync {
    fn user_info(&self) -> UserInfo;
}

/// StaticIdentity
///
/// A fixed identity, resolved once and handed to the route store.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(pub UserInfo);

impl StaticIdentity {
    /// The anonymous identity (empty user id).
    pub fn anonymous() -> Self {
        Self(UserInfo::default())
    }

    pub fn user(user_id: &str) -> Self {
        Self(UserInfo {
            user_id: user_id.to_string(),
            ..UserInfo::default()
        })
    }
}

impl IdentityAccessor for StaticIdentity {
    fn user_info(&self) -> UserInfo {
        self.0.clone()
    }
}

/// Claims
///
/// Payload expected inside the bearer token of an authenticated request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the route catalog user id.
    pub sub: String,
    /// Expiration Time (exp).
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity of an authenticated request. It doubles as the
/// identity accessor handed to the route store for that request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub info: UserInfo,
}

impl IdentityAccessor for AuthUser {
    fn user_info(&self) -> UserInfo {
        self.info.clone()
    }
}

/// AuthUser Extractor Implementation
///
/// 1. Local Bypass: in `Env::Local`, an `x-user-id` header naming a known
///    catalog user is accepted as-is.
/// 2. Token Validation: otherwise a `Bearer` JWT signed with the configured
///    secret is required; its `sub` must name a known catalog user.
///
/// Rejection: StatusCode::UNAUTHORIZED (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    CatalogState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let catalog = CatalogState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // Local Development Bypass
        if config.env == Env::Local {
            if let Some(info) = parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
                .and_then(|user_id| catalog.user_info(user_id))
            {
                return Ok(AuthUser { info });
            }
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("rejected expired token"),
                other => tracing::debug!(error = ?other, "rejected invalid token"),
            }
            StatusCode::UNAUTHORIZED
        })?;

        // The user may have been removed after the token was issued.
        let info = catalog
            .user_info(&token_data.claims.sub)
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(AuthUser { info })
    }
}
