//! # Audio Edit Endpoints
//!
//! One endpoint per edit. Each accepts `multipart/form-data`, runs the edit on
//! Tokio's blocking pool, and answers with the resulting WAV file as an
//! attachment.
//!
//! ## Available Endpoints:
//! - `POST /api/v1/cut` - `audio-file`, `start-time`, `end-time`
//! - `POST /api/v1/merge` - `audio-file-1`, `audio-file-2`
//! - `POST /api/v1/add_silence` - `audio-file`, `position`, `duration`
//!
//! Missing text fields fall back to the `defaults` section of the config.

use crate::audio::timecode::format_timecode;
use crate::audio::{self, parse_timecode, FrameBuffer, SilencePosition, TimeRange};
use crate::error::{AppError, AppResult};
use crate::handlers::upload::{UploadForm, UploadedFile};
use crate::state::AppState;
use crate::storage::output_filename;
use crate::wav;
use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use tracing::{info, warn};

pub const FRAMES_HEADER: &str = "X-Audio-Frames";
pub const DURATION_HEADER: &str = "X-Audio-Duration-Seconds";

/// The edits the service offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Cut,
    Merge,
    AddSilence,
}

impl Operation {
    /// Name used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Cut => "cut",
            Operation::Merge => "merge",
            Operation::AddSilence => "add_silence",
        }
    }

    /// Prefix of the output filename.
    pub fn output_prefix(&self) -> &'static str {
        match self {
            Operation::Cut => "processed",
            Operation::Merge => "merged",
            Operation::AddSilence => "silence",
        }
    }
}

/// Cut a time range out of one file.
///
/// ## Endpoint: `POST /api/v1/cut`
///
/// ## Form Fields:
/// - `audio-file`: the WAV file
/// - `start-time`: `M:SS`, default `0:00`
/// - `end-time`: `M:SS`, default `0:05`; clamped to the file's length
pub async fn cut(state: web::Data<AppState>, payload: Multipart) -> AppResult<HttpResponse> {
    let config = state.get_config();
    let mut form = UploadForm::read(payload, config.limits.max_upload_bytes).await?;
    let upload = form.take_file("audio-file")?;

    let start = form.text_or("start-time", &config.defaults.start_time);
    let end = form.text_or("end-time", &config.defaults.end_time);
    let range = TimeRange::from_timecodes(&start, &end)?;

    info!(filename = %upload.filename, start = %start, end = %end, "Cut requested");

    run_edit(&state, Operation::Cut, vec![upload], move |buffers| {
        audio::trim(&buffers[0], range)
    })
    .await
}

/// Append the second file to the first.
///
/// ## Endpoint: `POST /api/v1/merge`
///
/// ## Form Fields:
/// - `audio-file-1`, `audio-file-2`: WAV files with identical channel count,
///   sample width and frame rate
///
/// ## Errors:
/// 400 `incompatible_formats` with a `field` naming what differs.
pub async fn merge(state: web::Data<AppState>, payload: Multipart) -> AppResult<HttpResponse> {
    let config = state.get_config();
    let mut form = UploadForm::read(payload, config.limits.max_upload_bytes).await?;
    let first = form.take_file("audio-file-1")?;
    let second = form.take_file("audio-file-2")?;

    info!(first = %first.filename, second = %second.filename, "Merge requested");

    run_edit(&state, Operation::Merge, vec![first, second], |buffers| {
        audio::merge(&buffers[0], &buffers[1])
    })
    .await
}

/// Pad a file with silence.
///
/// ## Endpoint: `POST /api/v1/add_silence`
///
/// ## Form Fields:
/// - `audio-file`: the WAV file
/// - `position`: `start` or `end`, default `start`
/// - `duration`: `M:SS`, default `0:05`, at most `limits.max_silence_seconds`
pub async fn add_silence(state: web::Data<AppState>, payload: Multipart) -> AppResult<HttpResponse> {
    let config = state.get_config();
    let mut form = UploadForm::read(payload, config.limits.max_upload_bytes).await?;
    let upload = form.take_file("audio-file")?;

    let position: SilencePosition = form
        .text_or("position", &config.defaults.silence_position)
        .parse()
        .map_err(AppError::ValidationError)?;
    let duration = parse_timecode(&form.text_or("duration", &config.defaults.silence_duration))?;
    if duration > config.limits.max_silence_seconds {
        return Err(AppError::ValidationError(format!(
            "Silence of {}s exceeds the limit of {}s",
            duration, config.limits.max_silence_seconds
        )));
    }

    info!(
        filename = %upload.filename,
        %position,
        duration = %format_timecode(duration),
        "Silence requested"
    );

    run_edit(&state, Operation::AddSilence, vec![upload], move |buffers| {
        audio::insert_silence(&buffers[0], duration as f64, position)
    })
    .await
}

/// What the blocking half of an edit hands back.
struct EditOutput {
    encoded: Vec<u8>,
    frames: usize,
    seconds: f64,
    uploads: Vec<UploadedFile>,
}

/// The part every edit shares: reserve a job slot, decode, edit and encode off
/// the async workers, keep copies of the files if configured, then respond.
///
/// Uploads are only written to disk once the edit has succeeded, so rejected
/// requests leave nothing behind.
async fn run_edit<F>(
    state: &AppState,
    operation: Operation,
    uploads: Vec<UploadedFile>,
    edit: F,
) -> AppResult<HttpResponse>
where
    F: FnOnce(&[FrameBuffer]) -> audio::EditResult<FrameBuffer> + Send + 'static,
{
    let config = state.get_config();
    let _job = state.try_start_job().ok_or_else(|| {
        AppError::Busy(format!(
            "{} edits already running, try again shortly",
            config.limits.max_concurrent_jobs
        ))
    })?;

    let source_name = uploads[0].filename.clone();
    let filename = output_filename(operation.output_prefix(), &source_name);

    let result = tokio::task::spawn_blocking(move || -> AppResult<EditOutput> {
        let buffers = uploads
            .iter()
            .map(|upload| wav::decode(&upload.bytes))
            .collect::<Result<Vec<_>, _>>()?;
        let output = edit(&buffers)?;
        Ok(EditOutput {
            encoded: wav::encode(&output)?,
            frames: output.frame_count(),
            seconds: output.duration_seconds(),
            uploads,
        })
    })
    .await
    .map_err(|e| AppError::Internal(format!("Edit task failed: {}", e)))?;

    let EditOutput {
        encoded,
        frames,
        seconds,
        uploads,
    } = match result {
        Ok(output) => output,
        Err(e) => {
            warn!(operation = operation.name(), error = %e, "Edit rejected");
            state.record_operation_failure(operation.name());
            return Err(e);
        }
    };

    // Read the flag again; it may have been switched while the edit ran
    if state.get_config().storage.persist {
        for upload in &uploads {
            state.store.save_upload(&upload.filename, &upload.bytes).await?;
        }
        state
            .store
            .save_processed(operation.output_prefix(), &source_name, &encoded)
            .await?;
    }

    state.record_operation_success(operation.name(), encoded.len() as u64, seconds);
    info!(
        operation = operation.name(),
        frames,
        duration_seconds = seconds,
        bytes = encoded.len(),
        filename = %filename,
        "Edit completed"
    );

    Ok(HttpResponse::Ok()
        .content_type("audio/wav")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .insert_header((FRAMES_HEADER, frames.to_string()))
        .insert_header((DURATION_HEADER, format!("{:.3}", seconds)))
        .body(encoded))
}
