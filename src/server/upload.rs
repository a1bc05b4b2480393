use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::extract::Multipart;

use crate::core::errors::ApiError;

/// A file received in a multipart form and written to the uploads directory.
#[derive(Debug, Clone)]
pub struct SavedUpload {
    pub path: PathBuf,
    pub original_name: String,
}

#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<SavedUpload>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    /// Text field value, `None` when missing or blank.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

/// Reads the whole form, saving the part named `file_field` under
/// `uploads_dir/<unix-millis>-<sanitized name>` and keeping text parts.
pub async fn receive_upload(
    mut multipart: Multipart,
    uploads_dir: &Path,
    file_field: &str,
) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == file_field && field.file_name().is_some() {
            let original_name = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
            if data.is_empty() {
                continue;
            }

            tokio::fs::create_dir_all(uploads_dir)
                .await
                .map_err(ApiError::internal)?;
            let stored_name = format!(
                "{}-{}",
                chrono::Utc::now().timestamp_millis(),
                sanitize_upload_filename(&original_name)
            );
            let path = uploads_dir.join(stored_name);
            tokio::fs::write(&path, &data)
                .await
                .map_err(ApiError::internal)?;

            form.file = Some(SavedUpload {
                path,
                original_name,
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read field {}: {}", name, e)))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

/// Keeps the base name and replaces anything outside `[A-Za-z0-9._-]`.
fn sanitize_upload_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload.pdf".to_string()
    } else {
        cleaned.to_string()
    }
}
