//! # Audio Editing Core
//!
//! Frame-exact manipulation of uncompressed PCM audio held in memory.
//! Nothing in this module touches the network or the filesystem; callers
//! decode a container into a [`FrameBuffer`], run one of the operations in
//! [`processor`], and encode the result.
//!
//! ## Key Components:
//! - **Format**: channel count, sample width and frame rate of a stream
//! - **Frame Buffer**: immutable, frame-aligned PCM bytes tagged with their format
//! - **Time Codes**: `M:SS` parsing and `[start, end)` ranges
//! - **Silence**: zero-filled buffers of an exact duration
//! - **Processor**: trim, merge and silence insertion
//!
//! ## Alignment Rule:
//! Every buffer is a whole number of frames, where a frame is
//! `channels × sample_width` bytes. Each operation preserves this, so output
//! can always be written straight back into a container.

pub mod buffer;       // Frame-aligned PCM bytes
pub mod error;        // Typed failures of the core
pub mod format;       // Format descriptor and compatibility
pub mod processor;    // Trim, merge, insert silence
pub mod silence;      // Silence synthesis
pub mod timecode;     // M:SS parsing and time ranges

pub use buffer::FrameBuffer;
pub use error::{EditError, EditResult, FormatField};
pub use format::FormatDescriptor;
pub use processor::{insert_silence, merge, trim};
pub use silence::{synthesize, SilencePosition};
pub use timecode::{parse_timecode, TimeRange};
