//! # Error Handling
//!
//! Service-level error type and its conversion into JSON HTTP responses.
//!
//! Lower layers have their own typed errors ([`EditError`] for the audio
//! core, [`WavError`] for the container codec). Handlers return `AppResult`
//! and rely on the `From` impls below, so `?` turns any of them into the right
//! status code.
//!
//! ## JSON Response Format:
//! ```json
//! {
//!   "error": {
//!     "type": "incompatible_formats",
//!     "message": "incompatible formats: frame rate differs (44100 vs 48000)",
//!     "field": "frame_rate",
//!     "timestamp": "2025-01-01T12:00:00Z"
//!   }
//! }
//! ```

use crate::audio::{EditError, FormatField};
use crate::wav::WavError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

/// Errors a request handler can fail with.
#[derive(Debug)]
pub enum AppError {
    /// Server-side failures (I/O, worker panics)
    Internal(String),

    /// Client sent something unreadable (bad multipart body, malformed WAV header)
    BadRequest(String),

    /// User input failed validation (time codes, ranges, limits)
    ValidationError(String),

    /// The two uploads of a merge have different formats
    IncompatibleFormats { field: FormatField, message: String },

    /// Upload is not an uncompressed PCM WAV file
    UnsupportedMedia(String),

    /// Too many edits are already running
    Busy(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::IncompatibleFormats { message, .. } => write!(f, "{}", message),
            AppError::UnsupportedMedia(msg) => write!(f, "Unsupported media: {}", msg),
            AppError::Busy(msg) => write!(f, "Service busy: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_)
            | AppError::ValidationError(_)
            | AppError::IncompatibleFormats { .. } => StatusCode::BAD_REQUEST,
            AppError::UnsupportedMedia(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Busy(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_type, message) = match self {
            AppError::Internal(msg) => ("internal_error", msg),
            AppError::BadRequest(msg) => ("bad_request", msg),
            AppError::ValidationError(msg) => ("validation_error", msg),
            AppError::IncompatibleFormats { message, .. } => ("incompatible_formats", message),
            AppError::UnsupportedMedia(msg) => ("unsupported_container", msg),
            AppError::Busy(msg) => ("busy", msg),
        };

        let mut body = json!({
            "error": {
                "type": error_type,
                "message": message,
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        // Name the mismatched field so clients can tell the user what to fix
        if let AppError::IncompatibleFormats { field, .. } = self {
            body["error"]["field"] = json!(field.as_str());
        }

        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<EditError> for AppError {
    fn from(err: EditError) -> Self {
        match &err {
            EditError::IncompatibleFormats { field, .. } => AppError::IncompatibleFormats {
                field: *field,
                message: err.to_string(),
            },
            _ => AppError::ValidationError(err.to_string()),
        }
    }
}

impl From<WavError> for AppError {
    fn from(err: WavError) -> Self {
        match &err {
            WavError::UnsupportedContainer(_) => AppError::UnsupportedMedia(err.to_string()),
            WavError::MalformedHeader(_) => AppError::BadRequest(err.to_string()),
            WavError::TooLarge(_) => AppError::ValidationError(err.to_string()),
            WavError::Write(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(format!("JSON parsing error: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(format!("I/O error: {}", err))
    }
}

/// Shorthand for handler results.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_error_mapping() {
        let err: AppError = EditError::MalformedTimeCode("x".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, AppError::ValidationError(_)));

        let err: AppError = EditError::IncompatibleFormats {
            field: FormatField::SampleWidth,
            left: 2,
            right: 3,
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("sample width"));
    }

    #[test]
    fn test_wav_error_mapping() {
        let err: AppError = WavError::UnsupportedContainer("mp3".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let err: AppError = WavError::MalformedHeader("short fmt".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: AppError = WavError::Write("sample too wide".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_busy_is_service_unavailable() {
        let err = AppError::Busy("8 jobs running".to_string());
        assert_eq!(err.error_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
