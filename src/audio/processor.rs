//! # Audio Editing Operations
//!
//! The three edits the service offers, each a pure function from input
//! buffers to a freshly allocated output buffer:
//!
//! - **trim**: keep the frames inside a `[start, end)` time range
//! - **merge**: append one buffer to another of the same format
//! - **insert_silence**: pad a buffer with zeroed frames at either end
//!
//! Inputs are only borrowed and never modified, so the same decoded upload
//! can feed several operations concurrently.

use crate::audio::buffer::FrameBuffer;
use crate::audio::error::EditResult;
use crate::audio::silence::{synthesize, SilencePosition};
use crate::audio::timecode::{seconds_to_frames, TimeRange};
use tracing::debug;

/// Keep the frames of `buffer` that fall inside `range`.
///
/// ## Frame Math:
/// - **end** is clamped to the buffer's duration before conversion
/// - **start_frame** = floor(start × frame_rate)
/// - **end_frame** = floor(end × frame_rate), or every frame when clamped
///
/// A range that starts at or after its end, or past the last frame, yields an
/// empty buffer rather than an error.
pub fn trim(buffer: &FrameBuffer, range: TimeRange) -> EditResult<FrameBuffer> {
    let format = buffer.format();
    let total_frames = buffer.frame_count();
    let total_seconds = buffer.duration_seconds();

    let start_frame = seconds_to_frames(range.start(), format.frame_rate());
    let end_frame = if range.end() >= total_seconds {
        total_frames
    } else {
        seconds_to_frames(range.end(), format.frame_rate()).min(total_frames)
    };

    debug!(start_frame, end_frame, total_frames, "Trimming buffer");

    if start_frame >= end_frame {
        return Ok(FrameBuffer::empty(*format));
    }

    let bytes = buffer.frame_slice(start_frame, end_frame).to_vec();
    Ok(FrameBuffer::from_aligned(*format, bytes))
}

/// Append `second` to `first`.
///
/// ## Errors:
/// `IncompatibleFormats` naming the first field that differs. Nothing is
/// allocated in that case.
pub fn merge(first: &FrameBuffer, second: &FrameBuffer) -> EditResult<FrameBuffer> {
    first.format().ensure_compatible(second.format())?;

    let mut bytes = Vec::with_capacity(first.len_bytes() + second.len_bytes());
    bytes.extend_from_slice(first.as_bytes());
    bytes.extend_from_slice(second.as_bytes());

    debug!(
        first_frames = first.frame_count(),
        second_frames = second.frame_count(),
        "Merged buffers"
    );

    Ok(FrameBuffer::from_aligned(*first.format(), bytes))
}

/// Add `duration_seconds` of silence before or after `buffer`.
///
/// A zero duration returns a copy of the input.
pub fn insert_silence(
    buffer: &FrameBuffer,
    duration_seconds: f64,
    position: SilencePosition,
) -> EditResult<FrameBuffer> {
    let silence = synthesize(duration_seconds, buffer.format())?;

    debug!(
        silence_frames = silence.frame_count(),
        %position,
        "Inserting silence"
    );

    match position {
        SilencePosition::Start => merge(&silence, buffer),
        SilencePosition::End => merge(buffer, &silence),
    }
}
