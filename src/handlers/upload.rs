use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::services::upload::{StoredFile, UploadConfig, UploadService};
use axum::{extract::Multipart, response::IntoResponse, Extension};
use serde::Serialize;
use utoipa::ToSchema;

const MAX_FILES_PER_REQUEST: usize = 5;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub url: String,
    pub filename: String,
    pub size: usize,
}

impl From<StoredFile> for UploadResponse {
    fn from(f: StoredFile) -> Self {
        Self {
            url: f.url,
            filename: f.filename,
            size: f.size,
        }
    }
}

struct InboundFile {
    data: axum::body::Bytes,
    content_type: String,
    filename: String,
}

async fn next_file(multipart: &mut Multipart) -> AppResult<Option<InboundFile>> {
    let field = match multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?
    {
        Some(field) => field,
        None => return Ok(None),
    };

    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let filename = field.file_name().unwrap_or_default().to_string();

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read file data: {}", e)))?;

    Ok(Some(InboundFile {
        data,
        content_type,
        filename,
    }))
}

/// POST /api/upload/image — single image (multipart field "image").
#[utoipa::path(
    post,
    path = "/api/upload/image",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Image stored", body = ApiResponse<UploadResponse>),
        (status = 400, description = "Unsupported file type", body = AppError),
        (status = 413, description = "File exceeds 5MB", body = AppError),
    ),
    tag = "uploads"
)]
pub async fn upload_image(
    Extension(config): Extension<UploadConfig>,
    _auth_user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let file = next_file(&mut multipart)
        .await?
        .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    let stored =
        UploadService::save_image(&config, &file.data, &file.content_type, &file.filename).await?;

    Ok(ApiResponse::with_message(
        UploadResponse::from(stored),
        "Image uploaded successfully",
    ))
}

/// POST /api/upload/images — up to five images in one request.
#[utoipa::path(
    post,
    path = "/api/upload/images",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Images stored", body = ApiResponse<Vec<UploadResponse>>),
        (status = 400, description = "Too many files or unsupported type", body = AppError),
        (status = 413, description = "A file exceeds 5MB", body = AppError),
    ),
    tag = "uploads"
)]
pub async fn upload_images(
    Extension(config): Extension<UploadConfig>,
    _auth_user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut files = Vec::new();
    while let Some(file) = next_file(&mut multipart).await? {
        if files.len() == MAX_FILES_PER_REQUEST {
            return Err(AppError::Validation(
                "A maximum of 5 images is allowed".to_string(),
            ));
        }
        files.push(file);
    }

    if files.is_empty() {
        return Err(AppError::Validation("No file provided".to_string()));
    }

    let mut stored = Vec::with_capacity(files.len());
    for file in files {
        let saved =
            UploadService::save_image(&config, &file.data, &file.content_type, &file.filename)
                .await?;
        stored.push(UploadResponse::from(saved));
    }

    let message = format!("Successfully uploaded {} images", stored.len());
    Ok(ApiResponse::with_message(stored, message))
}
