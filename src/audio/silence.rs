//! Silence synthesis.

use crate::audio::buffer::FrameBuffer;
use crate::audio::error::{EditError, EditResult};
use crate::audio::format::FormatDescriptor;
use crate::audio::timecode::{ensure_seconds, seconds_to_frames};
use std::str::FromStr;

/// Where inserted silence goes relative to the existing audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SilencePosition {
    Start,
    End,
}

impl FromStr for SilencePosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "start" => Ok(SilencePosition::Start),
            "end" => Ok(SilencePosition::End),
            _ => Err(format!("Unknown silence position: {} (expected 'start' or 'end')", s)),
        }
    }
}

impl std::fmt::Display for SilencePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SilencePosition::Start => write!(f, "start"),
            SilencePosition::End => write!(f, "end"),
        }
    }
}

/// Produce `floor(duration_seconds * frame_rate)` frames of zero bytes.
///
/// Zero is the midpoint for signed sample widths, so the result plays back
/// as silence for 16, 24 and 32-bit PCM. A zero duration gives an empty
/// buffer.
///
/// ## Errors:
/// - `InvalidRange` for a negative or non-finite duration, or one whose byte
///   length does not fit in memory
pub fn synthesize(duration_seconds: f64, format: &FormatDescriptor) -> EditResult<FrameBuffer> {
    ensure_seconds("duration", duration_seconds)?;

    let too_long =
        || EditError::InvalidRange(format!("{} seconds of silence is too long", duration_seconds));

    // Check before converting, the cast to usize saturates
    let frame_size = format.frame_size();
    let exact_frames = (duration_seconds * format.frame_rate() as f64).floor();
    if exact_frames > isize::MAX as f64 / frame_size as f64 {
        return Err(too_long());
    }

    let len = seconds_to_frames(duration_seconds, format.frame_rate())
        .checked_mul(frame_size)
        .ok_or_else(too_long)?;
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|_| too_long())?;
    data.resize(len, 0u8);

    Ok(FrameBuffer::from_aligned(*format, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_matches_duration() {
        for (channels, width, rate, seconds) in [(1, 1, 8000, 0.5), (2, 2, 44100, 1.25), (6, 3, 48000, 2.0), (1, 4, 11025, 0.1)] {
            let format = FormatDescriptor::new(channels, width, rate).unwrap();
            let silence = synthesize(seconds, &format).unwrap();
            let expected_frames = (seconds * rate as f64).floor() as usize;
            assert_eq!(silence.frame_count(), expected_frames);
            assert_eq!(silence.len_bytes(), expected_frames * channels as usize * width as usize);
            assert!(silence.as_bytes().iter().all(|&b| b == 0));
        }
    }

    #[test]
    fn test_zero_duration_is_empty() {
        let format = FormatDescriptor::new(2, 2, 44100).unwrap();
        assert!(synthesize(0.0, &format).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_bad_durations() {
        let format = FormatDescriptor::new(1, 2, 8000).unwrap();
        assert!(matches!(synthesize(-1.0, &format), Err(EditError::InvalidRange(_))));
        assert!(matches!(synthesize(f64::INFINITY, &format), Err(EditError::InvalidRange(_))));
    }

    #[test]
    fn test_huge_duration_is_an_error() {
        let format = FormatDescriptor::new(1, 1, 8000).unwrap();
        assert!(matches!(synthesize(1e30, &format), Err(EditError::InvalidRange(_))));
        // Fits in isize but not in memory
        assert!(matches!(synthesize(1e15, &format), Err(EditError::InvalidRange(_))));

        let wide = FormatDescriptor::new(8, 4, 192_000).unwrap();
        assert!(matches!(synthesize(1e13, &wide), Err(EditError::InvalidRange(_))));
    }

    #[test]
    fn test_position_parsing() {
        assert_eq!("start".parse::<SilencePosition>().unwrap(), SilencePosition::Start);
        assert_eq!("END".parse::<SilencePosition>().unwrap(), SilencePosition::End);
        assert!("middle".parse::<SilencePosition>().is_err());
    }
}
