//! # Edit Errors
//!
//! Typed failures of the frame-manipulation engine. Every operation either
//! returns a complete, frame-aligned buffer or one of these errors; nothing is
//! ever partially written.

use std::fmt;
use thiserror::Error;

/// The format field that differed when two buffers were compared for a merge.
///
/// Fields are compared in declaration order, so the first mismatch reported is
/// always channels, then sample width, then frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatField {
    Channels,
    SampleWidth,
    FrameRate,
}

impl FormatField {
    /// Machine-readable name used in JSON error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatField::Channels => "channels",
            FormatField::SampleWidth => "sample_width",
            FormatField::FrameRate => "frame_rate",
        }
    }
}

impl fmt::Display for FormatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatField::Channels => write!(f, "channel count"),
            FormatField::SampleWidth => write!(f, "sample width"),
            FormatField::FrameRate => write!(f, "frame rate"),
        }
    }
}

/// Errors produced by the core audio operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// A time string was not of the form `M:SS`.
    #[error("malformed time code '{0}': expected minutes:seconds")]
    MalformedTimeCode(String),

    /// A time range or duration was negative or not a finite number.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// Two buffers could not be merged because their formats differ.
    #[error("incompatible formats: {field} differs ({left} vs {right})")]
    IncompatibleFormats {
        field: FormatField,
        left: u32,
        right: u32,
    },

    /// A format descriptor had a zero field.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// A byte buffer was not a whole number of frames long.
    #[error("buffer of {len} bytes is not aligned to {frame_size}-byte frames")]
    MisalignedBuffer { len: usize, frame_size: usize },
}

pub type EditResult<T> = Result<T, EditError>;
