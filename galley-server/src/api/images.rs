//! Uploaded Image Handling
//!
//! Products and recipes accept an optional `image` file in their multipart
//! forms. Files are validated, stored under the upload directory with a
//! random filename, and exposed by the static `/uploads/` route.

use std::fs;
use std::path::PathBuf;

use uuid::Uuid;

use crate::utils::AppError;

/// Maximum file size (5MB)
const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Supported image formats
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Validate an uploaded image file
fn validate_image(data: &[u8], ext: &str) -> Result<(), AppError> {
    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::validation(format!(
            "File too large. Maximum size is {}MB",
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    let ext_lower = ext.to_lowercase();
    if !SUPPORTED_FORMATS.contains(&ext_lower.as_str()) {
        return Err(AppError::validation(format!(
            "Unsupported file format '{}'. Supported: {}",
            ext_lower,
            SUPPORTED_FORMATS.join(", ")
        )));
    }

    // Verify it's actually an image by trying to load it
    if let Err(e) = image::load_from_memory(data) {
        return Err(AppError::validation(format!(
            "Invalid image file ({}): {}",
            ext_lower, e
        )));
    }

    Ok(())
}

/// Store an uploaded image and return its public path (`/uploads/<name>`).
///
/// The stored filename is a random 32-hex id keeping the original
/// extension, so repeated uploads never collide or overwrite.
pub fn save_upload(upload_dir: &str, original_name: &str, data: &[u8]) -> Result<String, AppError> {
    if data.is_empty() {
        return Err(AppError::validation("Empty file provided"));
    }

    let ext = PathBuf::from(original_name)
        .extension()
        .and_then(|ext| ext.to_str().map(|s| s.to_lowercase()))
        .ok_or_else(|| {
            AppError::validation(format!("Invalid file extension for: {original_name}"))
        })?;

    validate_image(data, &ext)?;

    let filename = format!("{}.{}", Uuid::new_v4().simple(), ext);
    let file_path = PathBuf::from(upload_dir).join(&filename);

    fs::write(&file_path, data)
        .map_err(|e| AppError::internal(format!("Failed to save file: {e}")))?;

    tracing::info!(
        original_name = %original_name,
        stored_as = %filename,
        size = data.len(),
        "Image uploaded"
    );

    Ok(format!("/uploads/{filename}"))
}
