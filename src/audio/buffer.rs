//! # Frame Buffer
//!
//! An immutable, frame-aligned block of interleaved PCM bytes together with
//! the format that gives those bytes meaning.
//!
//! ## Key Features:
//! - **Alignment**: the byte length is always a whole number of frames
//! - **Immutability**: no mutable access is handed out; operations build new buffers
//! - **Self-describing**: the buffer carries its [`FormatDescriptor`], so a
//!   buffer can never be paired with the wrong format by accident

use crate::audio::error::{EditError, EditResult};
use crate::audio::format::FormatDescriptor;

/// Frame-aligned PCM bytes plus their format.
///
/// ## Thread Safety:
/// The buffer is never mutated after construction, so a shared reference can
/// be read from any number of threads at once (for example, one upload used
/// as input to two operations).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    format: FormatDescriptor,
    data: Vec<u8>,
}

impl FrameBuffer {
    /// Wrap raw PCM bytes, checking that they hold whole frames.
    ///
    /// ## Errors:
    /// `MisalignedBuffer` if `data.len()` is not a multiple of
    /// `format.frame_size()`.
    pub fn new(format: FormatDescriptor, data: Vec<u8>) -> EditResult<Self> {
        let frame_size = format.frame_size();
        if data.len() % frame_size != 0 {
            return Err(EditError::MisalignedBuffer {
                len: data.len(),
                frame_size,
            });
        }

        Ok(Self { format, data })
    }

    /// A zero-length buffer. Valid input to every operation.
    pub fn empty(format: FormatDescriptor) -> Self {
        Self {
            format,
            data: Vec::new(),
        }
    }

    /// Build from bytes the caller has already aligned.
    pub(crate) fn from_aligned(format: FormatDescriptor, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len() % format.frame_size(), 0);
        Self { format, data }
    }

    pub fn format(&self) -> &FormatDescriptor {
        &self.format
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len_bytes(&self) -> usize {
        self.data.len()
    }

    pub fn frame_count(&self) -> usize {
        self.data.len() / self.format.frame_size()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Playback length in seconds, un-rounded.
    ///
    /// ## Calculation:
    /// Duration = frame_count / frame_rate
    pub fn duration_seconds(&self) -> f64 {
        self.frame_count() as f64 / self.format.frame_rate() as f64
    }

    /// Borrow the bytes of frames `[start, end)`.
    ///
    /// Both bounds are clamped to the buffer, and a reversed range yields an
    /// empty slice, so the result is always frame-aligned.
    pub fn frame_slice(&self, start: usize, end: usize) -> &[u8] {
        let frame_size = self.format.frame_size();
        let end = end.min(self.frame_count());
        let start = start.min(end);
        &self.data[start * frame_size..end * frame_size]
    }
}
