use crate::error::{AppError, AppResult};
use crate::middleware::auth::require_member_type;
use crate::middleware::AuthUser;
use crate::models::{MemberType, UserModel};
use crate::response::ApiResponse;
use crate::services::auth::AuthService;
use crate::services::email::EmailService;
use crate::services::pending::PendingStore;
use crate::services::user::{UserService, UserStats};
use crate::validation;
use axum::{http::StatusCode, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Email address (.edu domain required)
    pub email: Option<String>,
    /// Password (8-20 characters, letter + digit)
    pub password: Option<String>,
    /// Member type: STUDENT or ASSOCIATE
    pub member_type: Option<String>,
    /// Display name (optional)
    pub name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    /// Temporary registration id, consumed by the verification step
    pub temp_id: String,
    pub requires_verification: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Client-facing user projection (camelCase, no secrets).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub member_type: MemberType,
    pub verified: bool,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub university: Option<String>,
    pub enrollment_year: Option<i32>,
    pub join_date: String,
}

impl From<UserModel> for UserData {
    fn from(u: UserModel) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            member_type: u.member_type,
            verified: u.verified,
            avatar: u.avatar,
            bio: u.bio,
            university: u.university,
            enrollment_year: u.enrollment_year,
            join_date: u.join_date.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    /// JWT bearer token
    pub token: String,
    pub user_data: UserData,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserWithStats {
    #[serde(flatten)]
    pub user: UserData,
    pub successful_transactions: i64,
    pub average_rating: Option<f64>,
    pub rating_count: i64,
}

impl UserWithStats {
    pub fn new(user: UserModel, stats: UserStats) -> Self {
        Self {
            user: UserData::from(user),
            successful_transactions: stats.successful_transactions,
            average_rating: round_rating(stats.average_rating),
            rating_count: stats.rating_count,
        }
    }
}

/// Average ratings are reported rounded to one decimal.
pub fn round_rating(avg: Option<f64>) -> Option<f64> {
    avg.map(|v| (v * 10.0).round() / 10.0)
}

#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration staged, verification pending", body = RegisterResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 409, description = "Email already registered", body = AppError),
    ),
    tag = "users"
)]
pub async fn register(
    Extension(db): Extension<DatabaseConnection>,
    Extension(pending): Extension<PendingStore>,
    Extension(email_service): Extension<EmailService>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let errors = validation::validate_register(
        payload.email.as_deref(),
        payload.password.as_deref(),
        payload.member_type.as_deref(),
        payload.name.as_deref(),
    );
    if !errors.is_empty() {
        return Err(AppError::ValidationFailed(errors));
    }

    let (email, password, member_type_raw) =
        match (payload.email, payload.password, payload.member_type) {
            (Some(e), Some(p), Some(m)) => (e, p, m),
            _ => {
                return Err(AppError::Validation(
                    "Email, password and member type are required".to_string(),
                ))
            }
        };
    let member_type: MemberType = serde_json::from_value(Value::String(member_type_raw))
        .map_err(|_| AppError::Validation("Invalid member type".to_string()))?;
    let name = payload.name.filter(|n| !n.trim().is_empty());

    let service = AuthService::new(db);
    let temp_id = service
        .register_pending(&pending, &email_service, &email, &password, member_type, name)
        .await?;

    let response = RegisterResponse {
        success: true,
        message: "Registration received. Please verify your email to create the account."
            .to_string(),
        temp_id,
        requires_verification: true,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Invalid credentials", body = AppError),
    ),
    tag = "users"
)]
pub async fn login(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let errors = validation::validate_login(payload.email.as_deref(), payload.password.as_deref());
    if !errors.is_empty() {
        return Err(AppError::ValidationFailed(errors));
    }

    let (email, password) = match (payload.email, payload.password) {
        (Some(e), Some(p)) => (e, p),
        _ => return Err(AppError::InvalidCredentials),
    };

    let service = AuthService::new(db);
    let (user, token) = service.login(&email, &password).await?;

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        user_data: UserData::from(user),
    }))
}

#[utoipa::path(
    post,
    path = "/api/users/logout",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Logout successful", body = serde_json::Value),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "users"
)]
pub async fn logout(_auth_user: AuthUser) -> AppResult<impl IntoResponse> {
    // Stateless tokens: the client discards its copy.
    Ok(ApiResponse::message("Logout successful"))
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Current user with derived stats", body = ApiResponse<UserWithStats>),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "users"
)]
pub async fn get_current_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let service = UserService::new(db);
    let user = service.get_by_id(&auth_user.user_id).await?;
    let stats = service.stats(&auth_user.user_id).await?;

    Ok(ApiResponse::ok(UserWithStats::new(user, stats)))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SendVerificationResponse {
    pub success: bool,
    pub message: String,
    /// Returned so development clients can complete the loop without a
    /// mailbox.
    pub token: String,
}

#[utoipa::path(
    post,
    path = "/api/users/verification/send",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Verification email sent", body = SendVerificationResponse),
        (status = 400, description = "Already verified", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "verification"
)]
pub async fn send_verification(
    Extension(db): Extension<DatabaseConnection>,
    Extension(email_service): Extension<EmailService>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let service = AuthService::new(db);
    let token = service
        .send_verification(&auth_user.user_id, &email_service)
        .await?;

    Ok(Json(SendVerificationResponse {
        success: true,
        message: "Verification email sent".to_string(),
        token,
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    /// Verification token from the email
    pub token: Option<String>,
    /// Temporary registration id from the register step
    pub temp_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailResponse {
    pub success: bool,
    pub message: String,
    pub user_id: String,
}

#[utoipa::path(
    post,
    path = "/api/users/verification/verify",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Email verified, account created", body = VerifyEmailResponse),
        (status = 400, description = "Invalid or expired token", body = AppError),
    ),
    tag = "verification"
)]
pub async fn verify_email(
    Extension(db): Extension<DatabaseConnection>,
    Extension(pending): Extension<PendingStore>,
    Json(payload): Json<VerifyEmailRequest>,
) -> AppResult<impl IntoResponse> {
    let service = AuthService::new(db);
    let user = service
        .verify(&pending, payload.token.as_deref(), payload.temp_id.as_deref())
        .await?;

    Ok(Json(VerifyEmailResponse {
        success: true,
        message: "Email verified successfully".to_string(),
        user_id: user.id,
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkipVerificationRequest {
    pub temp_id: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/users/verification/skip",
    request_body = SkipVerificationRequest,
    responses(
        (status = 200, description = "Unverified account created", body = VerifyEmailResponse),
        (status = 400, description = "Invalid or expired registration", body = AppError),
    ),
    tag = "verification"
)]
pub async fn skip_verification(
    Extension(db): Extension<DatabaseConnection>,
    Extension(pending): Extension<PendingStore>,
    Json(payload): Json<SkipVerificationRequest>,
) -> AppResult<impl IntoResponse> {
    let temp_id = payload.temp_id.ok_or_else(|| {
        AppError::Validation("Temporary registration ID is required".to_string())
    })?;

    let service = AuthService::new(db);
    let user = service.skip_verification(&pending, &temp_id).await?;

    Ok(Json(VerifyEmailResponse {
        success: true,
        message: "Verification skipped, unverified account created".to_string(),
        user_id: user.id,
    }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerificationStatus {
    pub email: String,
    pub verified: bool,
}

#[utoipa::path(
    get,
    path = "/api/users/verification/status",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Verification status", body = ApiResponse<VerificationStatus>),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "verification"
)]
pub async fn verification_status(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let service = AuthService::new(db);
    let user = service.get_user_by_id(&auth_user.user_id).await?;

    Ok(ApiResponse::ok(VerificationStatus {
        email: user.email,
        verified: user.verified,
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminVerifyRequest {
    pub user_id: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/users/verification/admin-verify",
    security(("jwt_token" = [])),
    request_body = AdminVerifyRequest,
    responses(
        (status = 200, description = "User verified", body = serde_json::Value),
        (status = 403, description = "GENERAL members only", body = AppError),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "verification"
)]
pub async fn admin_verify(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<AdminVerifyRequest>,
) -> AppResult<impl IntoResponse> {
    require_member_type(&db, &auth_user, &[MemberType::General]).await?;

    let target = payload
        .user_id
        .ok_or_else(|| AppError::Validation("User ID is required".to_string()))?;

    let service = AuthService::new(db);
    service.admin_verify(&target).await?;

    Ok(ApiResponse::message("User verified"))
}
