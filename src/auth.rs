use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    config::AppConfig,
    error::ApiError,
    models::{Account, AccountStatus, Role},
};

/// Claims
///
/// The identity payload embedded in every token. Immutable once issued and never
/// persisted server-side: the token *is* the session. Role, status and office are
/// captured at issuance time, which means later account changes do not affect the
/// token until it expires or is refreshed (see the middleware notes below).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identity: the account's email.
    pub email: String,
    pub role: Role,
    pub status: AccountStatus,
    #[serde(rename = "officeId")]
    pub office_id: String,
    /// Issued-at, seconds since the epoch.
    pub iat: usize,
    /// Expiration time, seconds since the epoch.
    pub exp: usize,
}

/// TokenCodec
///
/// Issues and validates HS256 identity tokens. The signing secret and validity
/// window are injected at construction rather than read from global state, so
/// tests can run with distinct secrets side by side. All operations are pure
/// cryptographic checks; no I/O happens here.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_hours: i64,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_hours,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.token_secret, config.token_ttl_hours)
    }

    /// issue
    ///
    /// Produces a signed token for a validated, active account. Callers are
    /// responsible for the existence and status checks *before* issuing — this
    /// function only embeds what it is given.
    pub fn issue(&self, account: &Account) -> Result<String, ApiError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            email: account.email.clone(),
            role: account.role,
            status: account.status,
            office_id: account.office_id.clone(),
            iat: now as usize,
            exp: (now + self.ttl_hours * 3600) as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
    }

    /// verify
    ///
    /// Cryptographically validates signature and expiry. An expired-but-valid
    /// token is distinguished from a structurally broken one so the caller can
    /// steer clients toward the refresh flow.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => ApiError::TokenExpired,
                _ => ApiError::TokenMalformed,
            })
    }

    /// verify_ignoring_expiry
    ///
    /// Accepts an expired-but-otherwise-valid token. Used exclusively by the
    /// refresh flow; signature and structural failures are still rejected.
    pub fn verify_ignoring_expiry(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::default();
        validation.validate_exp = false;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| ApiError::TokenMalformed)
    }
}

/// AuthUser
///
/// The resolved identity of an authenticated request: the verified claims, as
/// embedded in the token. Deliberately **no database lookup** happens here — the
/// token is trusted until it expires, trading staleness of role/status for a
/// store round-trip per request. The admin and super-admin middlewares below are
/// the only paths that re-validate against current account state.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::TokenMissing)?;

        let claims = TokenCodec::from_config(&config).verify(token)?;

        // Status gate: a token carrying a non-active status is useless everywhere.
        if claims.status != AccountStatus::Active {
            return Err(ApiError::AccountInactive);
        }

        Ok(AuthUser(claims))
    }
}

/// require_auth
///
/// Route-layer middleware for the authenticated router. The `AuthUser` extractor
/// does all the work; a failed extraction rejects the request before the handler
/// runs.
pub async fn require_auth(_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// require_admin
///
/// Route-layer middleware for the admin router. Unlike the plain extractor this
/// path **re-fetches the account** and re-checks role, office and status against
/// current state, so a demoted or deactivated admin is locked out of admin
/// surfaces immediately rather than at token expiry.
pub async fn require_admin(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if claims.role == Role::Agent {
        return Err(ApiError::Forbidden("NOT ADMIN"));
    }

    let account = state
        .repo
        .find_account(&claims.email)
        .await?
        .ok_or(ApiError::AccountNotFound)?;

    match account.role {
        Role::Agent => return Err(ApiError::Forbidden("NOT ADMIN")),
        // An office admin's token must still belong to the office on record.
        Role::OfficeAdmin if account.office_id != claims.office_id => {
            return Err(ApiError::Forbidden("Unauthorized Office"));
        }
        _ => {}
    }

    if account.status != AccountStatus::Active {
        return Err(ApiError::AccountInactive);
    }

    Ok(next.run(request).await)
}

/// require_super_admin
///
/// Route-layer middleware for the super-admin router. Same re-fetching posture
/// as `require_admin`, restricted to the top role.
pub async fn require_super_admin(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if claims.role != Role::SuperAdmin {
        return Err(ApiError::Forbidden("NOT SUPER-ADMIN"));
    }

    let account = state
        .repo
        .find_account(&claims.email)
        .await?
        .ok_or(ApiError::AccountNotFound)?;

    if account.role != Role::SuperAdmin {
        return Err(ApiError::Forbidden("Super-Admin access only"));
    }

    if account.status != AccountStatus::Active {
        return Err(ApiError::AccountInactive);
    }

    Ok(next.run(request).await)
}
