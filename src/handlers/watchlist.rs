use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::services::watchlist::WatchlistService;
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    Extension,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct WatchToggleResponse {
    /// Whether the item is now on the caller's watchlist
    pub watched: bool,
}

#[utoipa::path(
    post,
    path = "/api/items/{id}/watch",
    security(("jwt_token" = [])),
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 200, description = "Watchlist toggled", body = ApiResponse<WatchToggleResponse>),
        (status = 401, description = "Unauthorized", body = crate::error::AppError),
        (status = 404, description = "Item not found", body = crate::error::AppError),
    ),
    tag = "watchlist"
)]
pub async fn toggle_watchlist(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(item_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = WatchlistService::new(db);
    let watched = service.toggle(&auth_user.user_id, &item_id).await?;

    Ok(ApiResponse::ok(WatchToggleResponse { watched }))
}

#[utoipa::path(
    get,
    path = "/api/watchlist",
    security(("jwt_token" = [])),
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("pageSize" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Watched items, newest first", body = PaginatedResponse<serde_json::Value>),
        (status = 401, description = "Unauthorized", body = crate::error::AppError),
    ),
    tag = "watchlist"
)]
pub async fn list_watchlist(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    let page = params.page.unwrap_or(1).max(1);
    let page_size = params.page_size.unwrap_or(20).clamp(1, 100);

    let service = WatchlistService::new(db);
    let (items, total) = service.list(&auth_user.user_id, page, page_size).await?;

    let data = crate::handlers::item::items_to_json(items)?;
    Ok(PaginatedResponse::new(data, total, page, page_size))
}
