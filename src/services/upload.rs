use crate::error::{AppError, AppResult};
use std::path::Path;
use tokio::fs;

#[derive(Clone)]
pub struct UploadConfig {
    pub upload_dir: String,
}

const MAX_FILE_SIZE: usize = 5 * 1024 * 1024; // 5 MB
const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];
const ALLOWED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];

/// Validate file magic bytes match the declared content type.
fn validate_magic_bytes(data: &[u8], content_type: &str) -> bool {
    match content_type {
        "image/jpeg" => data.len() >= 3 && data[..3] == [0xFF, 0xD8, 0xFF],
        "image/png" => data.len() >= 4 && data[..4] == [0x89, 0x50, 0x4E, 0x47],
        "image/gif" => data.len() >= 4 && data[..4] == [0x47, 0x49, 0x46, 0x38],
        "image/webp" => {
            data.len() >= 12
                && data[..4] == [0x52, 0x49, 0x46, 0x46]
                && data[8..12] == [0x57, 0x45, 0x42, 0x50]
        }
        _ => false,
    }
}

fn has_allowed_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn random_suffix() -> u32 {
    let mut buf = [0u8; 4];
    if getrandom::getrandom(&mut buf).is_err() {
        // Extremely unlikely; the timestamp still keeps names unique enough.
        return 0;
    }
    u32::from_le_bytes(buf) % 1_000_000_000
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub url: String,
    pub filename: String,
    pub size: usize,
}

pub struct UploadService;

impl UploadService {
    /// Persist one uploaded image under the upload directory.
    /// Size violations answer 413; type violations answer 400 naming the
    /// rejected type or extension.
    pub async fn save_image(
        config: &UploadConfig,
        data: &[u8],
        content_type: &str,
        original_filename: &str,
    ) -> AppResult<StoredFile> {
        if data.len() > MAX_FILE_SIZE {
            return Err(AppError::PayloadTooLarge);
        }

        if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
            return Err(AppError::Validation(format!(
                "Unsupported file type: {}. Allowed: jpeg, jpg, png, gif, webp",
                content_type
            )));
        }

        if !has_allowed_extension(original_filename) {
            return Err(AppError::Validation(format!(
                "Unsupported file extension on '{}'. Allowed: jpeg, jpg, png, gif, webp",
                original_filename
            )));
        }

        if !validate_magic_bytes(data, content_type) {
            return Err(AppError::Validation(
                "File content does not match declared content type".to_string(),
            ));
        }

        let ext = match content_type {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => return Err(AppError::Validation("Unsupported file type".to_string())),
        };

        let filename = format!(
            "item-{}-{}.{}",
            chrono::Utc::now().timestamp_millis(),
            random_suffix(),
            ext
        );

        let dir = Path::new(&config.upload_dir);
        fs::create_dir_all(dir).await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to create upload directory: {e}"))
        })?;

        let file_path = dir.join(&filename);
        fs::write(&file_path, data)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to write file: {e}")))?;

        Ok(StoredFile {
            url: format!("/uploads/{}", filename),
            filename,
            size: data.len(),
        })
    }
}
