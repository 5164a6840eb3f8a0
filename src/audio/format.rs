//! # PCM Format Descriptor
//!
//! Describes the layout of an uncompressed PCM stream: how many channels it
//! interleaves, how many bytes each sample occupies, and how many frames make
//! up one second. Two streams can be concatenated only when all three agree.

use crate::audio::error::{EditError, EditResult, FormatField};

/// The (channels, sample width, frame rate) triple of a PCM stream.
///
/// ## Invariant:
/// All three fields are strictly positive. The only way to build one is
/// [`FormatDescriptor::new`], which rejects zeros, so code holding a
/// descriptor never has to re-check it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatDescriptor {
    channels: u16,
    sample_width: u16,
    frame_rate: u32,
}

impl FormatDescriptor {
    /// Build a descriptor, failing with `InvalidFormat` if any field is zero.
    ///
    /// ## Parameters:
    /// - **channels**: interleaved channel count (1 = mono, 2 = stereo)
    /// - **sample_width**: bytes per sample (1, 2, 3 or 4 in practice)
    /// - **frame_rate**: frames per second in Hz
    pub fn new(channels: u16, sample_width: u16, frame_rate: u32) -> EditResult<Self> {
        if channels == 0 {
            return Err(EditError::InvalidFormat("channel count must be greater than 0".to_string()));
        }
        if sample_width == 0 {
            return Err(EditError::InvalidFormat("sample width must be greater than 0".to_string()));
        }
        if frame_rate == 0 {
            return Err(EditError::InvalidFormat("frame rate must be greater than 0".to_string()));
        }

        Ok(Self {
            channels,
            sample_width,
            frame_rate,
        })
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_width(&self) -> u16 {
        self.sample_width
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    /// Bytes in one frame: one sample for every channel.
    pub fn frame_size(&self) -> usize {
        self.channels as usize * self.sample_width as usize
    }

    /// Bits per sample, as written into a WAV `fmt ` chunk.
    pub fn bits_per_sample(&self) -> u16 {
        self.sample_width.saturating_mul(8)
    }

    /// Bytes of audio per second of playback.
    pub fn byte_rate(&self) -> u64 {
        self.frame_rate as u64 * self.frame_size() as u64
    }

    /// Check that `other` has the same layout.
    ///
    /// ## Returns:
    /// - **Ok(())**: every field matches
    /// - **Err(IncompatibleFormats)**: names the first field that differs,
    ///   checked in the order channels, sample width, frame rate
    pub fn ensure_compatible(&self, other: &FormatDescriptor) -> EditResult<()> {
        let pairs = [
            (FormatField::Channels, self.channels as u32, other.channels as u32),
            (FormatField::SampleWidth, self.sample_width as u32, other.sample_width as u32),
            (FormatField::FrameRate, self.frame_rate, other.frame_rate),
        ];

        match pairs.into_iter().find(|(_, left, right)| left != right) {
            Some((field, left, right)) => Err(EditError::IncompatibleFormats { field, left, right }),
            None => Ok(()),
        }
    }
}

impl std::fmt::Display for FormatDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}ch/{}-bit/{}Hz",
            self.channels,
            self.bits_per_sample(),
            self.frame_rate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_fields() {
        assert!(FormatDescriptor::new(0, 2, 44100).is_err());
        assert!(FormatDescriptor::new(2, 0, 44100).is_err());
        assert!(FormatDescriptor::new(2, 2, 0).is_err());
        assert!(FormatDescriptor::new(2, 2, 44100).is_ok());
    }

    #[test]
    fn test_frame_size() {
        let stereo = FormatDescriptor::new(2, 2, 44100).unwrap();
        assert_eq!(stereo.frame_size(), 4);
        assert_eq!(stereo.byte_rate(), 176_400);
        assert_eq!(stereo.bits_per_sample(), 16);
    }

    #[test]
    fn test_compatibility_reports_first_mismatch() {
        let a = FormatDescriptor::new(1, 2, 8000).unwrap();
        let b = FormatDescriptor::new(2, 1, 16000).unwrap();
        match a.ensure_compatible(&b) {
            Err(EditError::IncompatibleFormats { field, left, right }) => {
                assert_eq!(field, FormatField::Channels);
                assert_eq!((left, right), (1, 2));
            }
            other => panic!("expected incompatible formats, got {:?}", other),
        }

        let c = FormatDescriptor::new(1, 2, 16000).unwrap();
        match a.ensure_compatible(&c) {
            Err(EditError::IncompatibleFormats { field, .. }) => assert_eq!(field, FormatField::FrameRate),
            other => panic!("expected incompatible formats, got {:?}", other),
        }

        assert!(a.ensure_compatible(&a).is_ok());
    }

    #[test]
    fn test_display() {
        let format = FormatDescriptor::new(1, 1, 8000).unwrap();
        assert_eq!(format.to_string(), "1ch/8-bit/8000Hz");
    }
}
