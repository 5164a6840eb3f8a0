//! # Time Codes and Ranges
//!
//! Clients describe positions in a file as `minutes:seconds` strings
//! (`"1:30"`, `"0:05"`). This module turns those into seconds and validates
//! the ranges built from them.

use crate::audio::error::{EditError, EditResult};

/// Parse a `M:SS` time code into whole seconds.
///
/// Seconds are not normalized, so `"0:90"` is 90 seconds. Whitespace around
/// the whole string is ignored; anything else that is not a digit is an error.
///
/// ## Examples:
/// ```
/// use audio_editor_backend::audio::timecode::parse_timecode;
///
/// assert_eq!(parse_timecode("1:30").unwrap(), 90);
/// assert_eq!(parse_timecode("0:90").unwrap(), 90);
/// assert!(parse_timecode("90").is_err());
/// ```
pub fn parse_timecode(input: &str) -> EditResult<u64> {
    let malformed = || EditError::MalformedTimeCode(input.to_string());

    let mut parts = input.trim().split(':');
    let (minutes, seconds) = match (parts.next(), parts.next(), parts.next()) {
        (Some(minutes), Some(seconds), None) => (minutes, seconds),
        _ => return Err(malformed()),
    };

    let minutes = parse_component(minutes).ok_or_else(malformed)?;
    let seconds = parse_component(seconds).ok_or_else(malformed)?;

    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or_else(malformed)
}

fn parse_component(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Render whole seconds as `M:SS`.
pub fn format_timecode(total_seconds: u64) -> String {
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// A `[start, end)` span of a file in seconds.
///
/// ## Invariant:
/// Both bounds are finite and non-negative. `end` may be smaller than
/// `start` or larger than the file; the trimmer treats the former as an empty
/// range and clamps the latter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    start: f64,
    end: f64,
}

impl TimeRange {
    /// Build a range, rejecting negative, NaN and infinite bounds.
    pub fn new(start: f64, end: f64) -> EditResult<Self> {
        ensure_seconds("start", start)?;
        ensure_seconds("end", end)?;
        Ok(Self { start, end })
    }

    /// Build a range from two `M:SS` strings.
    pub fn from_timecodes(start: &str, end: &str) -> EditResult<Self> {
        let start = parse_timecode(start)?;
        let end = parse_timecode(end)?;
        Self::new(start as f64, end as f64)
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }
}

/// Reject durations and bounds that cannot be turned into a frame index.
pub(crate) fn ensure_seconds(name: &str, seconds: f64) -> EditResult<()> {
    if !seconds.is_finite() {
        return Err(EditError::InvalidRange(format!("{} must be a finite number of seconds", name)));
    }
    if seconds < 0.0 {
        return Err(EditError::InvalidRange(format!("{} must not be negative (got {})", name, seconds)));
    }
    Ok(())
}

/// Frame index reached after `seconds` at `frame_rate`, rounded down.
/// Saturates at `usize::MAX`; callers clamp or bound-check the result.
pub(crate) fn seconds_to_frames(seconds: f64, frame_rate: u32) -> usize {
    (seconds * frame_rate as f64).floor() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(parse_timecode("0:00").unwrap(), 0);
        assert_eq!(parse_timecode("0:05").unwrap(), 5);
        assert_eq!(parse_timecode("2:30").unwrap(), 150);
        assert_eq!(parse_timecode("1:75").unwrap(), 135);
        assert_eq!(parse_timecode(" 10:00 ").unwrap(), 600);
    }

    #[test]
    fn test_parse_malformed() {
        for input in ["", "5", "1:2:3", ":30", "1:", "-1:00", "1:-5", "a:10", "1.5:00", "1 :00", "+1:00"] {
            assert_eq!(
                parse_timecode(input),
                Err(EditError::MalformedTimeCode(input.to_string())),
                "input {:?} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_parse_overflow() {
        let huge = format!("{}:00", u64::MAX);
        assert!(matches!(parse_timecode(&huge), Err(EditError::MalformedTimeCode(_))));
    }

    #[test]
    fn test_format_timecode() {
        assert_eq!(format_timecode(0), "0:00");
        assert_eq!(format_timecode(65), "1:05");
        assert_eq!(format_timecode(600), "10:00");
    }

    #[test]
    fn test_range_validation() {
        assert!(TimeRange::new(0.0, 5.0).is_ok());
        assert!(TimeRange::new(5.0, 1.0).is_ok());
        assert!(matches!(TimeRange::new(-1.0, 5.0), Err(EditError::InvalidRange(_))));
        assert!(matches!(TimeRange::new(0.0, f64::NAN), Err(EditError::InvalidRange(_))));

        let range = TimeRange::from_timecodes("0:10", "1:00").unwrap();
        assert_eq!(range.start(), 10.0);
        assert_eq!(range.end(), 60.0);
    }

    #[test]
    fn test_seconds_to_frames_floors() {
        assert_eq!(seconds_to_frames(0.5, 8000), 4000);
        assert_eq!(seconds_to_frames(1.0 / 3.0, 10), 3);
        assert_eq!(seconds_to_frames(0.0, 44100), 0);
    }
}
