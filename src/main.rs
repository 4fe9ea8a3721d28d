mod config;
mod error;
mod handlers;
mod middleware;
mod migration;
mod models;
mod response;
mod routes;
mod services;
mod utils;
mod validation;

use axum::{extract::Extension, Router};
use sea_orm_migration::MigratorTrait;
use services::pending::PendingStore;
use services::upload::UploadConfig;
use std::env;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health_check,
        // User routes
        crate::handlers::register,
        crate::handlers::login,
        crate::handlers::auth::logout,
        crate::handlers::get_current_user,
        crate::handlers::user::get_profile,
        crate::handlers::user::update_profile,
        // Verification routes
        crate::handlers::send_verification,
        crate::handlers::verify_email,
        crate::handlers::skip_verification,
        crate::handlers::verification_status,
        crate::handlers::admin_verify,
        // Item routes
        crate::handlers::item::search_items,
        crate::handlers::item::list_items,
        crate::handlers::item::featured_items,
        crate::handlers::item::get_item,
        crate::handlers::item::create_item,
        crate::handlers::item::update_item,
        crate::handlers::item::delete_item,
        crate::handlers::item::increment_view,
        // Rating routes
        crate::handlers::rating::create_rating,
        crate::handlers::rating::list_user_ratings,
        // Watchlist routes
        crate::handlers::watchlist::toggle_watchlist,
        crate::handlers::watchlist::list_watchlist,
        // Upload routes
        crate::handlers::upload::upload_image,
        crate::handlers::upload::upload_images,
    ),
    components(
        schemas(
            crate::response::ApiResponse<serde_json::Value>,
            crate::response::PaginatedResponse<serde_json::Value>,
            crate::response::Pagination,
            crate::response::PaginationQuery,
            crate::error::AppError,
            // Users
            crate::handlers::auth::RegisterRequest,
            crate::handlers::auth::RegisterResponse,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::LoginResponse,
            crate::handlers::auth::UserData,
            crate::handlers::auth::UserWithStats,
            crate::handlers::auth::SendVerificationResponse,
            crate::handlers::auth::VerifyEmailRequest,
            crate::handlers::auth::VerifyEmailResponse,
            crate::handlers::auth::SkipVerificationRequest,
            crate::handlers::auth::VerificationStatus,
            crate::handlers::auth::AdminVerifyRequest,
            crate::handlers::user::ProfileResponse,
            crate::handlers::user::UpdateProfileRequest,
            // Items
            crate::handlers::item::CreateItemResponse,
            crate::models::MemberType,
            crate::models::Category,
            crate::models::Condition,
            crate::models::ItemStatus,
            // Ratings
            crate::handlers::rating::CreateRatingRequest,
            crate::handlers::rating::RatingResponse,
            // Watchlist
            crate::handlers::watchlist::WatchToggleResponse,
            // Uploads
            crate::handlers::upload::UploadResponse,
        )
    ),
    tags(
        (name = "users", description = "Registration, login and profiles"),
        (name = "verification", description = "Email verification flow"),
        (name = "items", description = "Listing management and search"),
        (name = "ratings", description = "Counterparty ratings"),
        (name = "watchlist", description = "Bookmarked listings"),
        (name = "uploads", description = "Image uploads"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "student_bay=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration before doing anything else
    let jwt_config = validate_config()?;
    utils::jwt::init_jwt_config(jwt_config)?;

    tracing::info!("Starting Student Bay API v{}...", env!("CARGO_PKG_VERSION"));

    let db = config::database::get_database().await?;
    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let pending = PendingStore::from_env();

    let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());
    let upload_config = UploadConfig {
        upload_dir: upload_dir.clone(),
    };

    let email_service = services::email::EmailService::from_env();
    if email_service.is_configured() {
        tracing::info!("SMTP email service configured");
    } else {
        tracing::warn!("SMTP not configured, verification tokens will be logged");
    }

    let app = create_app(&upload_dir)
        .layer(Extension(db))
        .layer(Extension(pending))
        .layer(Extension(upload_config))
        .layer(Extension(email_service));

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Validate all required configuration at startup (fail-fast).
fn validate_config() -> anyhow::Result<crate::config::jwt::JwtConfig> {
    // JWT config — validated and cached
    let jwt_config = config::jwt::JwtConfig::from_env()?;

    // DATABASE_URL — checked here for early error; actual connection happens later
    if env::var("DATABASE_URL").is_err() {
        return Err(anyhow::anyhow!(
            "DATABASE_URL environment variable must be set"
        ));
    }

    // Upload directory — create if needed
    let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());
    std::fs::create_dir_all(&upload_dir).map_err(|e| {
        anyhow::anyhow!("Failed to create upload directory '{}': {}", upload_dir, e)
    })?;

    Ok(jwt_config)
}

fn build_cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origin = env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origin == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = origin
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins).allow_credentials(true)
    }
}

fn create_app(upload_dir: &str) -> Router {
    Router::new()
        .merge(routes::create_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
