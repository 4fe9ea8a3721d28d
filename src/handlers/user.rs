use crate::error::{AppError, AppResult};
use crate::handlers::auth::{round_rating, UserData};
use crate::middleware::{AuthUser, OptionalAuthUser};
use crate::response::ApiResponse;
use crate::services::user::{ProfileChanges, UserService, UserStats};
use crate::validation;
use axum::{extract::Query, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserData,
    pub successful_transactions: i64,
    pub average_rating: Option<f64>,
    pub rating_count: i64,
    /// Populated optional fields among {name, avatar, bio, university,
    /// enrollment year}, as a percentage.
    pub profile_completeness: u32,
}

impl ProfileResponse {
    fn new(user: crate::models::UserModel, stats: UserStats) -> Self {
        let profile_completeness = UserService::profile_completeness(&user);
        Self {
            user: UserData::from(user),
            successful_transactions: stats.successful_transactions,
            average_rating: round_rating(stats.average_rating),
            rating_count: stats.rating_count,
            profile_completeness,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileQuery {
    /// Target user; defaults to the authenticated caller
    pub user_id: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/users/profile",
    params(("userId" = Option<String>, Query, description = "Target user id")),
    responses(
        (status = 200, description = "Profile with stats and completeness", body = ApiResponse<ProfileResponse>),
        (status = 400, description = "No target user", body = AppError),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "users"
)]
pub async fn get_profile(
    Extension(db): Extension<DatabaseConnection>,
    OptionalAuthUser(auth_user): OptionalAuthUser,
    Query(query): Query<ProfileQuery>,
) -> AppResult<impl IntoResponse> {
    let user_id = query
        .user_id
        .or(auth_user.map(|u| u.user_id))
        .ok_or_else(|| {
            AppError::Validation("A user ID or authentication is required".to_string())
        })?;

    let service = UserService::new(db);
    let user = service.get_by_id(&user_id).await?;
    let stats = service.stats(&user_id).await?;

    Ok(ApiResponse::ok(ProfileResponse::new(user, stats)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    /// Display name; an empty string means "no change"
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub university: Option<String>,
    pub enrollment_year: Option<i32>,
}

#[utoipa::path(
    put,
    path = "/api/users/profile",
    security(("jwt_token" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<UserData>),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "users"
)]
pub async fn update_profile(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<impl IntoResponse> {
    let errors = validation::validate_profile_update(
        payload.name.as_deref(),
        payload.bio.as_deref(),
        payload.university.as_deref(),
        payload.enrollment_year,
    );
    if !errors.is_empty() {
        return Err(AppError::ValidationFailed(errors));
    }

    let changes = ProfileChanges {
        name: payload.name.filter(|n| !n.trim().is_empty()),
        avatar: payload.avatar,
        bio: payload.bio,
        university: payload.university,
        enrollment_year: payload.enrollment_year,
    };

    let service = UserService::new(db);
    let user = service.update_profile(&auth_user.user_id, changes).await?;

    Ok(ApiResponse::with_message(
        UserData::from(user),
        "Profile updated successfully",
    ))
}
