use crate::{
    error::{AppError, AppResult},
    models::{MemberType, User, UserModel},
    utils::jwt::decode_token,
};
use axum::{
    extract::FromRequestParts, extract::Request, http::HeaderMap, middleware::Next,
    response::Response,
};
use sea_orm::{DatabaseConnection, EntityTrait};

/// Identity extracted from a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
    pub member_type: String,
}

impl AuthUser {
    fn from_claims(claims: crate::utils::jwt::Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            member_type: claims.member_type,
        }
    }
}

/// Required-auth middleware: a missing token answers 401, a malformed or
/// expired one answers 403, and a valid one attaches `AuthUser` to the
/// request extensions.
pub async fn auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    let claims = decode_token(&token).map_err(|_| AppError::InvalidToken)?;

    request
        .extensions_mut()
        .insert(AuthUser::from_claims(claims));

    Ok(next.run(request).await)
}

/// Optional-auth middleware: same verification, but an absent or invalid
/// token is not an error — the request simply proceeds anonymously.
pub async fn optional_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_bearer_token(&headers) {
        if let Ok(claims) = decode_token(&token) {
            request
                .extensions_mut()
                .insert(AuthUser::from_claims(claims));
        }
    }

    next.run(request).await
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;

    let token = auth_header.strip_prefix("Bearer ")?;
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Member-type gate. The current type is re-read from the store rather than
/// trusted from the token, in case it changed after issuance.
pub async fn require_member_type(
    db: &DatabaseConnection,
    auth_user: &AuthUser,
    allowed: &[MemberType],
) -> AppResult<UserModel> {
    let user = User::find_by_id(auth_user.user_id.clone())
        .one(db)
        .await?
        .ok_or(AppError::Forbidden)?;

    if !allowed.contains(&user.member_type) {
        return Err(AppError::Forbidden);
    }

    Ok(user)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Extractor for routes under the optional-auth middleware.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<AuthUser>().cloned()))
    }
}
