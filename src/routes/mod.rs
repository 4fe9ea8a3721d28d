use crate::config::rate_limit::RateLimitConfig;
use crate::handlers;
use crate::middleware::auth::{auth_middleware, optional_auth_middleware};
use axum::{
    extract::DefaultBodyLimit, http::StatusCode, middleware, response::IntoResponse, routing,
    Extension, Json, Router,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use serde_json::json;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

// Five 5MB files plus multipart framing.
const UPLOAD_BODY_LIMIT: usize = 32 * 1024 * 1024;

pub fn create_routes() -> Router {
    Router::new()
        .nest("/api", api_routes())
        .fallback(not_found)
}

/// Catch-all: unknown paths still answer a JSON body.
async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "API endpoint not found",
        })),
    )
}

fn api_routes() -> Router {
    let rate_limit = RateLimitConfig::from_env();

    let public = public_routes();
    let optional = optional_auth_routes().layer(middleware::from_fn(optional_auth_middleware));
    let protected = protected_routes().layer(middleware::from_fn(auth_middleware));

    with_optional_rate_limit(public.merge(optional).merge(protected), rate_limit)
}

/// Public routes: no token needed.
fn public_routes() -> Router {
    Router::new()
        .route("/health", routing::get(health_check))
        // Users
        .route("/users/register", routing::post(handlers::register))
        .route("/users/login", routing::post(handlers::login))
        .route(
            "/users/verification/verify",
            routing::post(handlers::verify_email),
        )
        .route(
            "/users/verification/skip",
            routing::post(handlers::skip_verification),
        )
        .route(
            "/users/{id}/ratings",
            routing::get(handlers::rating::list_user_ratings),
        )
        // Items
        .route("/items/search", routing::get(handlers::item::search_items))
        .route("/items", routing::get(handlers::item::list_items))
        .route(
            "/items/featured",
            routing::get(handlers::item::featured_items),
        )
        .route("/items/{id}", routing::get(handlers::item::get_item))
        .route(
            "/items/{id}/view",
            routing::post(handlers::item::increment_view),
        )
}

/// Routes with dual anonymous/authenticated behavior.
fn optional_auth_routes() -> Router {
    Router::new().route(
        "/users/profile",
        routing::get(handlers::user::get_profile),
    )
}

/// Protected routes: all authenticated operations.
fn protected_routes() -> Router {
    Router::new()
        // Users
        .route("/users/logout", routing::post(handlers::logout))
        .route("/users/me", routing::get(handlers::get_current_user))
        .route(
            "/users/profile",
            routing::put(handlers::user::update_profile),
        )
        .route(
            "/users/verification/send",
            routing::post(handlers::send_verification),
        )
        .route(
            "/users/verification/status",
            routing::get(handlers::verification_status),
        )
        .route(
            "/users/verification/admin-verify",
            routing::post(handlers::admin_verify),
        )
        // Items
        .route("/items", routing::post(handlers::item::create_item))
        .route(
            "/items/{id}",
            routing::put(handlers::item::update_item).delete(handlers::item::delete_item),
        )
        // Watchlist
        .route(
            "/items/{id}/watch",
            routing::post(handlers::watchlist::toggle_watchlist),
        )
        .route(
            "/watchlist",
            routing::get(handlers::watchlist::list_watchlist),
        )
        // Ratings
        .route("/ratings", routing::post(handlers::rating::create_rating))
        // Uploads
        .route(
            "/upload/image",
            routing::post(handlers::upload::upload_image),
        )
        .route(
            "/upload/images",
            routing::post(handlers::upload::upload_images),
        )
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

fn with_optional_rate_limit(router: Router, config: RateLimitConfig) -> Router {
    if !config.enabled {
        return router;
    }

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(config.rule.per_second)
        .burst_size(config.rule.burst_size)
        .finish()
        .expect("Invalid rate limit configuration");

    router.layer(GovernorLayer::new(governor_conf))
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Health check successful", body = serde_json::Value)
    )
)]
pub async fn health_check(Extension(db): Extension<DatabaseConnection>) -> impl IntoResponse {
    let db_ok = db
        .query_one(Statement::from_string(
            sea_orm::DatabaseBackend::Sqlite,
            "SELECT 1".to_string(),
        ))
        .await
        .is_ok();

    let status = if db_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "message": "Student Bay API is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
