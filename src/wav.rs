//! # WAV Container Codec
//!
//! Converts between RIFF/WAVE files and [`FrameBuffer`]s using `hound` for the
//! container. Only integer PCM is accepted (plain or WAVE_FORMAT_EXTENSIBLE);
//! anything else is reported as an unsupported container so the HTTP layer
//! can answer 415.
//!
//! ## Sample Layout:
//! `hound` hands out samples as signed integers. They are packed back into
//! little-endian bytes of the container's width, with 8-bit samples restored
//! to their unsigned form, so a decoded buffer holds exactly the bytes of the
//! file's data chunk.

use crate::audio::{FormatDescriptor, FrameBuffer};
use byteorder::{ByteOrder, LittleEndian};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Cursor;
use thiserror::Error;

const MAX_SAMPLE_WIDTH: usize = 4;

/// Largest header `hound` writes (WAVE_FORMAT_EXTENSIBLE).
const MAX_HEADER_LEN: usize = 68;

/// Failures while reading or writing a WAV container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WavError {
    /// Not a RIFF/WAVE file, or not integer PCM.
    #[error("unsupported container: {0}")]
    UnsupportedContainer(String),

    /// A RIFF/WAVE file whose chunks are missing or inconsistent.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// More audio than a 32-bit RIFF size field can describe.
    #[error("{0} bytes of audio do not fit in a WAV file")]
    TooLarge(usize),

    /// The writer rejected the samples it was given.
    #[error("failed to write WAV data: {0}")]
    Write(String),
}

fn read_error(err: hound::Error) -> WavError {
    match err {
        hound::Error::Unsupported => {
            WavError::UnsupportedContainer("WAV encoding is not integer PCM".to_string())
        }
        other => WavError::MalformedHeader(other.to_string()),
    }
}

fn write_error(err: hound::Error) -> WavError {
    WavError::Write(err.to_string())
}

/// Decode a WAV file into its frames.
///
/// Samples are read until the data chunk or the input runs out, and any
/// trailing partial frame is dropped, so truncated uploads still decode to
/// whole frames.
pub fn decode(bytes: &[u8]) -> Result<FrameBuffer, WavError> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(WavError::UnsupportedContainer("not a RIFF/WAVE file".to_string()));
    }

    let mut reader = WavReader::new(Cursor::new(bytes)).map_err(read_error)?;
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int {
        return Err(WavError::UnsupportedContainer(
            "floating-point samples are not supported".to_string(),
        ));
    }

    let sample_width = spec.bits_per_sample.div_ceil(8);
    let width = usize::from(sample_width);
    if !(1..=MAX_SAMPLE_WIDTH).contains(&width) {
        return Err(WavError::UnsupportedContainer(format!(
            "{}-bit samples are not supported",
            spec.bits_per_sample
        )));
    }
    let format = FormatDescriptor::new(spec.channels, sample_width, spec.sample_rate)
        .map_err(|e| WavError::MalformedHeader(e.to_string()))?;

    // The declared length is untrusted; never reserve more than the input holds
    let declared = (reader.len() as usize).saturating_mul(width);
    let mut data = Vec::with_capacity(declared.min(bytes.len()));
    let mut packed = [0u8; MAX_SAMPLE_WIDTH];

    for sample in reader.samples::<i32>() {
        let sample = match sample {
            Ok(sample) => sample,
            // Reading from memory, so an I/O error means the input ended early
            Err(hound::Error::IoError(_)) => break,
            Err(e) => return Err(read_error(e)),
        };
        pack_sample(&mut packed[..width], sample);
        data.extend_from_slice(&packed[..width]);
    }

    data.truncate(data.len() - data.len() % format.frame_size());
    Ok(FrameBuffer::from_aligned(format, data))
}

/// Encode frames as an integer PCM WAV file.
pub fn encode(buffer: &FrameBuffer) -> Result<Vec<u8>, WavError> {
    let format = buffer.format();
    let data = buffer.as_bytes();

    let width = usize::from(format.sample_width());
    if !(1..=MAX_SAMPLE_WIDTH).contains(&width) {
        return Err(WavError::UnsupportedContainer(format!(
            "{}-byte samples cannot be stored as PCM",
            width
        )));
    }
    if data.len() > u32::MAX as usize - MAX_HEADER_LEN - 1 {
        return Err(WavError::TooLarge(data.len()));
    }

    let spec = WavSpec {
        channels: format.channels(),
        sample_rate: format.frame_rate(),
        bits_per_sample: format.bits_per_sample(),
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(MAX_HEADER_LEN + data.len() + 1));
    let mut writer = WavWriter::new(&mut cursor, spec).map_err(write_error)?;
    for sample in data.chunks_exact(width) {
        writer.write_sample(unpack_sample(sample)).map_err(write_error)?;
    }
    writer.finalize().map_err(write_error)?;

    Ok(cursor.into_inner())
}

/// Little-endian sample bytes to the signed value `hound` expects.
fn unpack_sample(bytes: &[u8]) -> i32 {
    match bytes.len() {
        1 => i32::from(bytes[0]) - 128,
        2 => i32::from(LittleEndian::read_i16(bytes)),
        3 => LittleEndian::read_i24(bytes),
        _ => LittleEndian::read_i32(bytes),
    }
}

fn pack_sample(out: &mut [u8], sample: i32) {
    match out.len() {
        1 => out[0] = (sample + 128) as u8,
        2 => LittleEndian::write_i16(out, sample as i16),
        3 => LittleEndian::write_i24(out, sample),
        _ => LittleEndian::write_i32(out, sample),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_buffer(channels: u16, width: u16, rate: u32, frames: usize) -> FrameBuffer {
        let format = FormatDescriptor::new(channels, width, rate).unwrap();
        let data = (0..frames * format.frame_size()).map(|i| (i % 200) as u8 + 1).collect();
        FrameBuffer::new(format, data).unwrap()
    }

    fn hound_file<F>(spec: WavSpec, write: F) -> Vec<u8>
    where
        F: FnOnce(&mut WavWriter<&mut Cursor<Vec<u8>>>),
    {
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
        write(&mut writer);
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    fn data_chunk_offset(bytes: &[u8]) -> usize {
        bytes.windows(4).position(|w| w == b"data").unwrap()
    }

    #[test]
    fn test_encoded_file_reads_back_in_hound() {
        let buffer = sample_buffer(2, 2, 44100, 10);
        let bytes = encode(&buffer).unwrap();

        let mut reader = WavReader::new(Cursor::new(&bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, SampleFormat::Int);

        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        let expected: Vec<i16> = buffer
            .as_bytes()
            .chunks_exact(2)
            .map(LittleEndian::read_i16)
            .collect();
        assert_eq!(samples, expected);
    }

    #[test]
    fn test_decode_hound_written_8_bit() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 8,
            sample_format: SampleFormat::Int,
        };
        let bytes = hound_file(spec, |writer| {
            for sample in [-128i8, -1, 0, 127] {
                writer.write_sample(sample).unwrap();
            }
        });

        let decoded = decode(&bytes).unwrap();
        assert_eq!(*decoded.format(), FormatDescriptor::new(1, 1, 8000).unwrap());
        assert_eq!(decoded.as_bytes(), &[0, 127, 128, 255]);
    }

    #[test]
    fn test_decode_hound_written_24_bit_stereo() {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 96000,
            bits_per_sample: 24,
            sample_format: SampleFormat::Int,
        };
        let samples = [-8_388_608i32, 8_388_607, -1, 1, 0, 123_456];
        let bytes = hound_file(spec, |writer| {
            for sample in samples {
                writer.write_sample(sample).unwrap();
            }
        });

        let decoded = decode(&bytes).unwrap();
        assert_eq!(*decoded.format(), FormatDescriptor::new(2, 3, 96000).unwrap());
        assert_eq!(decoded.frame_count(), 3);

        let mut expected = vec![0u8; samples.len() * 3];
        for (chunk, sample) in expected.chunks_exact_mut(3).zip(samples) {
            LittleEndian::write_i24(chunk, sample);
        }
        assert_eq!(decoded.as_bytes(), expected.as_slice());
    }

    #[test]
    fn test_decode_reads_back_encoded_file() {
        let buffer = sample_buffer(1, 3, 48000, 7);
        let bytes = encode(&buffer).unwrap();
        assert_eq!(decode(&bytes).unwrap(), buffer);

        let empty = FrameBuffer::empty(FormatDescriptor::new(1, 2, 8000).unwrap());
        assert_eq!(decode(&encode(&empty).unwrap()).unwrap(), empty);
    }

    #[test]
    fn test_decode_skips_unknown_chunks() {
        let buffer = sample_buffer(1, 2, 8000, 4);
        let encoded = encode(&buffer).unwrap();
        let data_at = data_chunk_offset(&encoded);

        let mut bytes = encoded[..data_at].to_vec();
        bytes.extend_from_slice(b"LIST");
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.extend_from_slice(b"abcd");
        bytes.extend_from_slice(&encoded[data_at..]);

        assert_eq!(decode(&bytes).unwrap(), buffer);
    }

    #[test]
    fn test_decode_truncated_data_drops_partial_frame() {
        let buffer = sample_buffer(2, 2, 8000, 10);
        let mut bytes = encode(&buffer).unwrap();
        let data_at = data_chunk_offset(&bytes);
        bytes.truncate(data_at + 8 + 13);

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.frame_count(), 3);
        assert_eq!(decoded.as_bytes(), &buffer.as_bytes()[..12]);
    }

    #[test]
    fn test_decode_rejects_non_riff() {
        assert!(matches!(decode(b"ID3\x04 not a wave"), Err(WavError::UnsupportedContainer(_))));
        assert!(matches!(decode(b""), Err(WavError::UnsupportedContainer(_))));
    }

    #[test]
    fn test_decode_rejects_float_samples() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let bytes = hound_file(spec, |writer| {
            writer.write_sample(0.5f32).unwrap();
        });
        assert!(matches!(decode(&bytes), Err(WavError::UnsupportedContainer(_))));
    }

    #[test]
    fn test_decode_rejects_zero_channels() {
        let mut bytes = encode(&sample_buffer(1, 2, 8000, 2)).unwrap();
        let fmt_at = bytes.windows(4).position(|w| w == b"fmt ").unwrap();
        LittleEndian::write_u16(&mut bytes[fmt_at + 10..fmt_at + 12], 0);
        assert!(decode(&bytes).is_err());
    }

    #[test]
    fn test_decode_requires_fmt_before_data() {
        let mut bytes = b"RIFF\x00\x00\x00\x00WAVE".to_vec();
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&[0, 0]);
        assert!(matches!(decode(&bytes), Err(WavError::MalformedHeader(_))));

        let header_only = b"RIFF\x04\x00\x00\x00WAVE".to_vec();
        assert!(matches!(decode(&header_only), Err(WavError::MalformedHeader(_))));
    }

    #[test]
    fn test_encode_rejects_wide_samples() {
        let buffer = sample_buffer(1, 5, 8000, 2);
        assert!(matches!(encode(&buffer), Err(WavError::UnsupportedContainer(_))));
    }

    #[test]
    fn test_sample_packing_is_byte_exact() {
        for bytes in [&[0x00u8][..], &[0xFF], &[0x34, 0x92], &[0x01, 0x02, 0x83], &[0, 0, 0, 0x80]] {
            let mut packed = vec![0u8; bytes.len()];
            pack_sample(&mut packed, unpack_sample(bytes));
            assert_eq!(packed, bytes);
        }
    }
}
