use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{Category, CategoryDetails, Condition, ItemModel, ItemStatus};
use crate::response::{ApiResponse, PaginatedResponse};
use crate::services::item::{ItemChanges, ItemService, ListParams, NewItem, SearchParams, SortBy};
use crate::services::user::UserService;
use crate::utils::fields;
use crate::validation;
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;
const DEFAULT_FEATURED_LIMIT: u64 = 8;

/// Shape a stored item row for clients: parse the image list, keep only the
/// tagged category's payload, then camelCase every key.
pub(crate) fn item_to_json(item: ItemModel) -> AppResult<Value> {
    let images = fields::parse_image_list(item.images.as_deref());
    let details = CategoryDetails::from_model(&item);

    let mut value = json!({
        "id": item.id,
        "seller_id": item.seller_id,
        "title": item.title,
        "description": item.description,
        "category": item.category,
        "price": item.price,
        "condition": item.condition,
        "status": item.status,
        "view_count": item.view_count,
        "images": images,
        "post_date": item.post_date,
        "created_at": item.created_at,
        "updated_at": item.updated_at,
    });

    let details = serde_json::to_value(&details)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize details: {e}")))?;
    if let (Value::Object(map), Value::Object(detail_map)) = (&mut value, details) {
        for (key, detail) in detail_map {
            map.insert(key, detail);
        }
    }

    Ok(fields::convert_keys_to_camel_case(value))
}

pub(crate) fn items_to_json(items: Vec<ItemModel>) -> AppResult<Vec<Value>> {
    items.into_iter().map(item_to_json).collect()
}

fn parse_multi<T: serde::de::DeserializeOwned>(
    raw: Option<&str>,
    message: &str,
) -> AppResult<Vec<T>> {
    let raw = match raw.filter(|r| !r.trim().is_empty()) {
        Some(raw) => raw,
        None => return Ok(Vec::new()),
    };

    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            serde_json::from_value(Value::String(part.to_string()))
                .map_err(|_| AppError::Validation(message.to_string()))
        })
        .collect()
}

fn parse_price_filter(raw: Option<&str>, name: &str) -> AppResult<Option<f64>> {
    match raw.filter(|r| !r.trim().is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| AppError::Validation(format!("{} must be a number", name))),
    }
}

fn page_bounds(page: Option<u64>, page_size: Option<u64>) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let page_size = page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    (page, page_size)
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemsQuery {
    /// Substring matched against title and description
    pub keyword: Option<String>,
    /// Category filter, single or comma-separated
    pub category: Option<String>,
    /// Condition filter, single or comma-separated
    pub condition: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    /// newest | price_asc | price_desc | views
    pub sort_by: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/items/search",
    params(
        ("keyword" = Option<String>, Query, description = "Keyword over title/description"),
        ("category" = Option<String>, Query, description = "Category filter (comma-separated)"),
        ("condition" = Option<String>, Query, description = "Condition filter (comma-separated)"),
        ("minPrice" = Option<String>, Query, description = "Inclusive lower price bound"),
        ("maxPrice" = Option<String>, Query, description = "Inclusive upper price bound"),
        ("sortBy" = Option<String>, Query, description = "newest, price_asc, price_desc, views"),
        ("page" = Option<u64>, Query, description = "Page number"),
        ("pageSize" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Search results", body = PaginatedResponse<serde_json::Value>),
        (status = 400, description = "Invalid filter", body = AppError),
    ),
    tag = "items"
)]
pub async fn search_items(
    Extension(db): Extension<DatabaseConnection>,
    Query(query): Query<SearchItemsQuery>,
) -> AppResult<impl IntoResponse> {
    let categories: Vec<Category> = parse_multi(
        query.category.as_deref(),
        "Category must be one of: TEXTBOOK, ELECTRONICS, FURNITURE, APPAREL, SPORTS",
    )?;
    let conditions: Vec<Condition> = parse_multi(
        query.condition.as_deref(),
        "Condition must be one of: NEW, LIKE_NEW, GOOD, FAIR, POOR",
    )?;
    let min_price = parse_price_filter(query.min_price.as_deref(), "minPrice")?;
    let max_price = parse_price_filter(query.max_price.as_deref(), "maxPrice")?;
    let (page, page_size) = page_bounds(query.page, query.page_size);

    let params = SearchParams {
        keyword: query.keyword,
        categories,
        conditions,
        min_price,
        max_price,
        sort_by: Some(SortBy::parse(query.sort_by.as_deref())),
        page,
        page_size,
    };

    let service = ItemService::new(db);
    let (items, total) = service.search(&params).await?;

    Ok(PaginatedResponse::new(
        items_to_json(items)?,
        total,
        page,
        page_size,
    ))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListItemsQuery {
    pub category: Option<String>,
    pub status: Option<String>,
    pub seller_id: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/items",
    params(
        ("category" = Option<String>, Query, description = "Category filter"),
        ("status" = Option<String>, Query, description = "AVAILABLE, RESERVED or SOLD"),
        ("sellerId" = Option<String>, Query, description = "Seller filter"),
        ("page" = Option<u64>, Query, description = "Page number"),
        ("pageSize" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Listings, soft-deleted rows excluded", body = PaginatedResponse<serde_json::Value>),
        (status = 400, description = "Invalid filter", body = AppError),
    ),
    tag = "items"
)]
pub async fn list_items(
    Extension(db): Extension<DatabaseConnection>,
    Query(query): Query<ListItemsQuery>,
) -> AppResult<impl IntoResponse> {
    let category = parse_multi::<Category>(
        query.category.as_deref(),
        "Category must be one of: TEXTBOOK, ELECTRONICS, FURNITURE, APPAREL, SPORTS",
    )?
    .into_iter()
    .next();

    // The DELETED sentinel is not a filterable status.
    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => {
            let status: ItemStatus = serde_json::from_value(Value::String(raw.to_string()))
                .map_err(|_| {
                    AppError::Validation(
                        "Status must be one of: AVAILABLE, RESERVED, SOLD".to_string(),
                    )
                })?;
            if status == ItemStatus::Deleted {
                return Err(AppError::Validation(
                    "Status must be one of: AVAILABLE, RESERVED, SOLD".to_string(),
                ));
            }
            Some(status)
        }
    };

    let (page, page_size) = page_bounds(query.page, query.page_size);
    let params = ListParams {
        category,
        status,
        seller_id: query.seller_id.filter(|s| !s.is_empty()),
        page,
        page_size,
    };

    let service = ItemService::new(db);
    let (items, total) = service.list(&params).await?;

    Ok(PaginatedResponse::new(
        items_to_json(items)?,
        total,
        page,
        page_size,
    ))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FeaturedQuery {
    pub limit: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/items/featured",
    params(("limit" = Option<u64>, Query, description = "Number of items, default 8")),
    responses(
        (status = 200, description = "Top available listings by views", body = ApiResponse<serde_json::Value>),
    ),
    tag = "items"
)]
pub async fn featured_items(
    Extension(db): Extension<DatabaseConnection>,
    Query(query): Query<FeaturedQuery>,
) -> AppResult<impl IntoResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_FEATURED_LIMIT).clamp(1, 50);

    let service = ItemService::new(db);
    let items = service.featured(limit).await?;

    Ok(ApiResponse::ok(items_to_json(items)?))
}

#[utoipa::path(
    get,
    path = "/api/items/{id}",
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item with seller projection", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Item not found", body = AppError),
    ),
    tag = "items"
)]
pub async fn get_item(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = ItemService::new(db.clone());
    let item = service.get_visible(&id).await?;

    let user_service = UserService::new(db);
    let seller = match user_service.get_by_id(&item.seller_id).await {
        Ok(user) => {
            let stats = user_service.stats(&user.id).await?;
            let average = crate::handlers::auth::round_rating(stats.average_rating);
            json!({
                "id": user.id,
                "name": user.name,
                "email": user.email,
                "member_type": user.member_type,
                "verified": user.verified,
                "average_rating": average,
            })
        }
        Err(AppError::NotFound) => Value::Null,
        Err(e) => return Err(e),
    };

    let mut value = item_to_json(item)?;
    value["seller"] = fields::convert_keys_to_camel_case(seller);

    Ok(ApiResponse::ok(value))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemResponse {
    pub success: bool,
    pub message: String,
    pub item_id: String,
}

#[utoipa::path(
    post,
    path = "/api/items",
    security(("jwt_token" = [])),
    request_body = serde_json::Value,
    responses(
        (status = 201, description = "Item created", body = CreateItemResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "items"
)]
pub async fn create_item(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(raw): Json<Value>,
) -> AppResult<impl IntoResponse> {
    let payload = fields::normalize_item_payload(raw);

    let errors = validation::validate_item_create(&payload);
    if !errors.is_empty() {
        return Err(AppError::ValidationFailed(errors));
    }

    let category: Category = serde_json::from_value(payload["category"].clone())
        .map_err(|_| AppError::Validation("Invalid category".to_string()))?;
    let condition: Condition = serde_json::from_value(payload["condition"].clone())
        .map_err(|_| AppError::Validation("Invalid condition".to_string()))?;
    let price = validation::parse_price(&payload["price"])
        .ok_or_else(|| AppError::Validation("Price must be a valid number".to_string()))?;
    let details = CategoryDetails::from_payload(category, &payload)?;

    let new_item = NewItem {
        title: payload["title"].as_str().unwrap_or_default().trim().to_string(),
        description: payload
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
        category,
        price,
        condition,
        images: string_list(payload.get("images")),
        details,
    };

    let service = ItemService::new(db);
    let item = service.create(&auth_user.user_id, new_item).await?;

    let response = CreateItemResponse {
        success: true,
        message: "Item posted successfully".to_string(),
        item_id: item.id,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

fn string_list(raw: Option<&Value>) -> Vec<String> {
    raw.and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[utoipa::path(
    put,
    path = "/api/items/{id}",
    security(("jwt_token" = [])),
    params(("id" = String, Path, description = "Item id")),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Item updated", body = serde_json::Value),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Not the seller", body = AppError),
        (status = 404, description = "Item not found", body = AppError),
    ),
    tag = "items"
)]
pub async fn update_item(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(raw): Json<Value>,
) -> AppResult<impl IntoResponse> {
    let payload = fields::normalize_item_payload(raw);

    let errors = validation::validate_item_update(&payload);
    if !errors.is_empty() {
        return Err(AppError::ValidationFailed(errors));
    }

    let condition = match payload.get("condition") {
        Some(raw) => Some(
            serde_json::from_value::<Condition>(raw.clone())
                .map_err(|_| AppError::Validation("Invalid condition".to_string()))?,
        ),
        None => None,
    };
    let status = match payload.get("status") {
        Some(raw) => Some(
            serde_json::from_value::<ItemStatus>(raw.clone())
                .map_err(|_| AppError::Validation("Invalid status".to_string()))?,
        ),
        None => None,
    };

    let changes = ItemChanges {
        title: payload
            .get("title")
            .and_then(Value::as_str)
            .map(|t| t.trim().to_string()),
        description: payload
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
        price: payload.get("price").and_then(validation::parse_price),
        condition,
        images: payload
            .get("images")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            }),
        status,
        buyer_id: payload
            .get("buyer_id")
            .and_then(Value::as_str)
            .map(str::to_string),
    };

    let service = ItemService::new(db);
    service.update(&id, &auth_user.user_id, changes).await?;

    Ok(ApiResponse::message("Item updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/items/{id}",
    security(("jwt_token" = [])),
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item soft-deleted", body = serde_json::Value),
        (status = 403, description = "Not the seller", body = AppError),
        (status = 404, description = "Item not found", body = AppError),
    ),
    tag = "items"
)]
pub async fn delete_item(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = ItemService::new(db);
    service.soft_delete(&id, &auth_user.user_id).await?;

    Ok(ApiResponse::message("Item deleted successfully"))
}

#[utoipa::path(
    post,
    path = "/api/items/{id}/view",
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 200, description = "View count incremented", body = serde_json::Value),
    ),
    tag = "items"
)]
pub async fn increment_view(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = ItemService::new(db);
    service.increment_views(&id).await?;

    Ok(ApiResponse::message("View count updated"))
}
