//! Multipart form collection for the edit endpoints.

use crate::error::{AppError, AppResult};
use actix_multipart::{Field, Multipart};
use futures_util::stream::StreamExt;
use std::collections::HashMap;

/// Text fields are time codes and positions; anything longer is not a form value.
const MAX_TEXT_FIELD_BYTES: usize = 1024;

/// One uploaded file, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// All fields of a multipart request, split into files and text.
#[derive(Debug, Default)]
pub struct UploadForm {
    files: HashMap<String, UploadedFile>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    /// Drain a multipart payload.
    ///
    /// ## Limits:
    /// - each file is capped at `max_file_bytes`
    /// - each text field is capped at 1KB
    ///
    /// A file part with an empty filename and no content is what browsers send
    /// for an untouched file input, so it is treated as absent.
    pub async fn read(mut payload: Multipart, max_file_bytes: usize) -> AppResult<Self> {
        let mut form = UploadForm::default();

        while let Some(item) = payload.next().await {
            let field = item.map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;

            let content_disposition = field
                .content_disposition()
                .ok_or_else(|| AppError::BadRequest("Missing content disposition".to_string()))?;
            let name = content_disposition
                .get_name()
                .ok_or_else(|| AppError::BadRequest("Missing field name".to_string()))?
                .to_string();
            let filename = content_disposition.get_filename().map(|s| s.to_string());

            match filename {
                Some(filename) => {
                    let bytes = read_field(field, max_file_bytes, &name).await?;
                    if filename.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.insert(name, UploadedFile { filename, bytes });
                }
                None => {
                    let bytes = read_field(field, MAX_TEXT_FIELD_BYTES, &name).await?;
                    let value = String::from_utf8(bytes)
                        .map_err(|_| AppError::BadRequest(format!("Field '{}' is not valid UTF-8", name)))?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// Remove and return a required file field.
    pub fn take_file(&mut self, name: &str) -> AppResult<UploadedFile> {
        self.files
            .remove(name)
            .ok_or_else(|| AppError::ValidationError(format!("No audio file provided in field '{}'", name)))
    }

    /// A text field's value, or `default` when it is missing or blank.
    pub fn text_or(&self, name: &str, default: &str) -> String {
        match self.fields.get(name).map(|v| v.trim()) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => default.to_string(),
        }
    }
}

async fn read_field(mut field: Field, limit: usize, name: &str) -> AppResult<Vec<u8>> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::BadRequest(format!("Chunk error: {}", e)))?;
        if bytes.len() + chunk.len() > limit {
            return Err(AppError::ValidationError(format!(
                "Field '{}' too large (max: {} bytes)",
                name, limit
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}
