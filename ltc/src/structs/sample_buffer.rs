//! PCM sample buffers
//!
//! The decoder reads audio through the [`SampleBuffer`] trait so callers can
//! hand over whatever storage their container reader produced. [`PcmBuffer`]
//! is the stock implementation over interleaved little-endian bytes.

use std::fmt::{Display, Formatter};

use crate::utils::errors::FormatError;

/// Sample encodings the digitizer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// Unsigned 8-bit, silence at 128.
    U8,
    S16,
    S24,
    S32,
    F32,
}

impl SampleFormat {
    /// Maps a container's bit depth and float flag to a sample format.
    pub fn from_bit_depth(bits: u16, is_float: bool) -> Result<Self, FormatError> {
        match (bits, is_float) {
            (8, false) => Ok(Self::U8),
            (16, false) => Ok(Self::S16),
            (24, false) => Ok(Self::S24),
            (32, false) => Ok(Self::S32),
            (32, true) => Ok(Self::F32),
            (bits, is_float) => Err(FormatError::UnsupportedEncoding {
                bits,
                kind: if is_float { "float" } else { "integer" },
            }),
        }
    }

    pub const fn bytes_per_sample(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::S16 => 2,
            Self::S24 => 3,
            Self::S32 | Self::F32 => 4,
        }
    }

    /// Decodes one little-endian sample to a value in `[-1, 1)`.
    #[inline(always)]
    fn normalize(self, bytes: &[u8]) -> f64 {
        match self {
            Self::U8 => (bytes[0] as f64 - 128.0) / 128.0,
            Self::S16 => i16::from_le_bytes([bytes[0], bytes[1]]) as f64 / 32_768.0,
            Self::S24 => {
                // sign-extend through the top byte of an i32
                let value = i32::from_le_bytes([0, bytes[0], bytes[1], bytes[2]]) >> 8;
                value as f64 / 8_388_608.0
            }
            Self::S32 => {
                i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64
                    / 2_147_483_648.0
            }
            Self::F32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
        }
    }
}

impl Display for SampleFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SampleFormat::U8 => "8-bit unsigned",
            SampleFormat::S16 => "16-bit signed",
            SampleFormat::S24 => "24-bit signed",
            SampleFormat::S32 => "32-bit signed",
            SampleFormat::F32 => "32-bit float",
        };

        f.write_str(name)
    }
}

/// Read access to a multi-channel PCM stream.
pub trait SampleBuffer {
    fn sample_rate(&self) -> u32;
    fn format(&self) -> SampleFormat;
    fn channels(&self) -> usize;

    /// Number of sample frames (samples per channel).
    fn frames(&self) -> usize;

    /// The `index`-th sample of `channel`, normalized to `[-1, 1)`.
    fn sample(&self, index: usize, channel: usize) -> f64;

    fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate() as f64
    }
}

/// Interleaved little-endian PCM data, as stored in a WAVE `data` chunk.
#[derive(Debug, Clone)]
pub struct PcmBuffer {
    data: Vec<u8>,
    format: SampleFormat,
    channels: usize,
    sample_rate: u32,
}

impl PcmBuffer {
    pub fn new(
        data: Vec<u8>,
        format: SampleFormat,
        channels: usize,
        sample_rate: u32,
    ) -> Result<Self, FormatError> {
        if channels == 0 {
            return Err(FormatError::NoChannels);
        }
        if sample_rate == 0 {
            return Err(FormatError::ZeroSampleRate);
        }

        let frame_size = format.bytes_per_sample() * channels;
        if data.len() % frame_size != 0 {
            return Err(FormatError::TruncatedSampleData {
                len: data.len(),
                frame_size,
            });
        }

        Ok(Self {
            data,
            format,
            channels,
            sample_rate,
        })
    }

    /// Builds a 32-bit float buffer from interleaved samples.
    pub fn from_f32(samples: &[f32], channels: usize, sample_rate: u32) -> Result<Self, FormatError> {
        let data = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        Self::new(data, SampleFormat::F32, channels, sample_rate)
    }

    /// Builds a 16-bit buffer from interleaved samples.
    pub fn from_i16(samples: &[i16], channels: usize, sample_rate: u32) -> Result<Self, FormatError> {
        let data = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        Self::new(data, SampleFormat::S16, channels, sample_rate)
    }
}

impl SampleBuffer for PcmBuffer {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn format(&self) -> SampleFormat {
        self.format
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn frames(&self) -> usize {
        self.data.len() / (self.format.bytes_per_sample() * self.channels)
    }

    #[inline(always)]
    fn sample(&self, index: usize, channel: usize) -> f64 {
        let width = self.format.bytes_per_sample();
        let start = (index * self.channels + channel) * width;
        self.format.normalize(&self.data[start..start + width])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unsupported_depths() {
        assert_eq!(
            SampleFormat::from_bit_depth(12, false),
            Err(FormatError::UnsupportedEncoding {
                bits: 12,
                kind: "integer"
            })
        );
        assert!(SampleFormat::from_bit_depth(64, true).is_err());
        assert_eq!(SampleFormat::from_bit_depth(32, true), Ok(SampleFormat::F32));
    }

    #[test]
    fn normalizes_each_format() -> Result<(), FormatError> {
        let u8_buf = PcmBuffer::new(vec![0, 128, 255], SampleFormat::U8, 1, 8000)?;
        assert_eq!(u8_buf.sample(0, 0), -1.0);
        assert_eq!(u8_buf.sample(1, 0), 0.0);
        assert!(u8_buf.sample(2, 0) > 0.99);

        let s24 = PcmBuffer::new(
            vec![0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x40],
            SampleFormat::S24,
            1,
            48000,
        )?;
        assert!(s24.sample(0, 0) < 0.0);
        assert_eq!(s24.sample(1, 0), 0.5);

        let s32 = PcmBuffer::new(i32::MIN.to_le_bytes().to_vec(), SampleFormat::S32, 1, 48000)?;
        assert_eq!(s32.sample(0, 0), -1.0);
        Ok(())
    }

    #[test]
    fn interleaved_channels() -> Result<(), FormatError> {
        let buf = PcmBuffer::from_i16(&[100, -100, 200, -200], 2, 48000)?;
        assert_eq!(buf.frames(), 2);
        assert!(buf.sample(1, 0) > 0.0);
        assert!(buf.sample(1, 1) < 0.0);
        Ok(())
    }

    #[test]
    fn rejects_truncated_data() {
        assert_eq!(
            PcmBuffer::new(vec![0; 5], SampleFormat::S16, 2, 48000).err(),
            Some(FormatError::TruncatedSampleData {
                len: 5,
                frame_size: 4
            })
        );
    }
}
