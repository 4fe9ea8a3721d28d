use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::RatingModel;
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::services::rating::RatingService;
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRatingRequest {
    pub rated_user_id: Option<String>,
    /// Optional transaction link; at most one rating per (rater, item)
    pub item_id: Option<String>,
    /// 1 to 5 inclusive
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub id: String,
    pub rated_user_id: String,
    pub rater_user_id: String,
    pub rater_name: Option<String>,
    pub item_id: Option<String>,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: String,
}

impl RatingResponse {
    fn new(rating: RatingModel, rater_name: Option<String>) -> Self {
        Self {
            id: rating.id,
            rated_user_id: rating.rated_user_id,
            rater_user_id: rating.rater_user_id,
            rater_name,
            item_id: rating.item_id,
            rating: rating.rating,
            comment: rating.comment,
            created_at: rating.created_at.to_string(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/ratings",
    security(("jwt_token" = [])),
    request_body = CreateRatingRequest,
    responses(
        (status = 201, description = "Rating recorded", body = ApiResponse<RatingResponse>),
        (status = 400, description = "Validation error", body = AppError),
        (status = 404, description = "Rated user or item not found", body = AppError),
        (status = 409, description = "Already rated this transaction", body = AppError),
    ),
    tag = "ratings"
)]
pub async fn create_rating(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<CreateRatingRequest>,
) -> AppResult<impl IntoResponse> {
    let mut errors = Vec::new();
    if payload
        .rated_user_id
        .as_deref()
        .map_or(true, |id| id.trim().is_empty())
    {
        errors.push("Rated user is required".to_string());
    }
    match payload.rating {
        Some(rating) if (1..=5).contains(&rating) => {}
        _ => errors.push("Rating must be an integer between 1 and 5".to_string()),
    }
    if !errors.is_empty() {
        return Err(AppError::ValidationFailed(errors));
    }

    let rated_user_id = payload.rated_user_id.unwrap_or_default();
    let rating_value = payload.rating.unwrap_or_default();

    let service = RatingService::new(db);
    let rating = service
        .create(
            &auth_user.user_id,
            &rated_user_id,
            payload.item_id.filter(|id| !id.trim().is_empty()),
            rating_value,
            payload.comment.filter(|c| !c.trim().is_empty()),
        )
        .await?;

    let rater_name = None; // the caller knows who they are
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            RatingResponse::new(rating, rater_name),
            "Rating submitted successfully",
        ),
    ))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/ratings",
    params(
        ("id" = String, Path, description = "Rated user id"),
        ("page" = Option<u64>, Query, description = "Page number"),
        ("pageSize" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Ratings received by the user", body = PaginatedResponse<RatingResponse>),
    ),
    tag = "ratings"
)]
pub async fn list_user_ratings(
    Extension(db): Extension<DatabaseConnection>,
    Path(user_id): Path<String>,
    Query(params): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    let page = params.page.unwrap_or(1).max(1);
    let page_size = params.page_size.unwrap_or(20).clamp(1, 100);

    let service = RatingService::new(db);
    let (rows, total) = service.list_received(&user_id, page, page_size).await?;

    let data = rows
        .into_iter()
        .map(|(rating, rater_name)| RatingResponse::new(rating, rater_name))
        .collect();

    Ok(PaginatedResponse::new(data, total, page, page_size))
}
