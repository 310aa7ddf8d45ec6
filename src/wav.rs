use std::io::{self, BufWriter, Seek, SeekFrom, Write};

use anyhow::{Result, anyhow, bail, ensure};
use log::{debug, warn};
use ltc::structs::sample_buffer::{PcmBuffer, SampleFormat};

use crate::byteorder::{ReadBytesLe, WriteBytesLe};
use crate::join_bytes_le;

pub const WAVE_FORMAT_PCM: u16 = 0x0001;
pub const WAVE_FORMAT_IEEE_FLOAT: u16 = 0x0003;
pub const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Contents of a `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    /// Format tag, resolved through the sub-format GUID for
    /// `WAVE_FORMAT_EXTENSIBLE`.
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

impl WavFormat {
    fn parse(body: &[u8]) -> Result<Self> {
        let field = |value: Option<u16>| value.ok_or_else(|| anyhow!("fmt chunk too short ({} bytes)", body.len()));

        let mut format_tag = field(body.u16_le(0))?;
        let channels = field(body.u16_le(2))?;
        let sample_rate = body
            .u32_le(4)
            .ok_or_else(|| anyhow!("fmt chunk too short ({} bytes)", body.len()))?;
        let block_align = field(body.u16_le(12))?;
        let bits_per_sample = field(body.u16_le(14))?;

        if format_tag == WAVE_FORMAT_EXTENSIBLE {
            // first two bytes of the sub-format GUID carry the format tag
            format_tag = field(body.u16_le(24))?;
        }

        Ok(Self {
            format_tag,
            channels,
            sample_rate,
            block_align,
            bits_per_sample,
        })
    }

    pub fn sample_format(&self) -> Result<SampleFormat> {
        let format = match self.format_tag {
            WAVE_FORMAT_PCM => SampleFormat::from_bit_depth(self.bits_per_sample, false)?,
            WAVE_FORMAT_IEEE_FLOAT => SampleFormat::from_bit_depth(self.bits_per_sample, true)?,
            tag => bail!("Unsupported WAV format tag 0x{tag:04X}"),
        };

        Ok(format)
    }
}

pub struct WavFile {
    pub format: WavFormat,
    pub buffer: PcmBuffer,
}

/// Walks the chunks of a RIFF/WAVE file and wraps its `data` chunk.
///
/// Chunk sizes running past the end of `data` are clamped, which covers
/// files written to a pipe with a placeholder size. A trailing partial
/// sample frame is dropped.
pub fn read_wav(data: &[u8]) -> Result<WavFile> {
    ensure!(
        data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WAVE",
        "Not a RIFF/WAVE file"
    );

    let mut format = None;
    let mut samples: Option<&[u8]> = None;
    let mut offset = 12;

    while offset + 8 <= data.len() {
        let id = &data[offset..offset + 4];
        let declared = data.u32_le(offset + 4).unwrap_or(0) as usize;
        let body_start = offset + 8;

        let available = data.len() - body_start;
        let len = if declared > available {
            warn!(
                "Chunk '{}' declares {declared} bytes, only {available} present",
                String::from_utf8_lossy(id)
            );
            available
        } else {
            declared
        };
        let body = &data[body_start..body_start + len];

        match id {
            b"fmt " => format = Some(WavFormat::parse(body)?),
            b"data" => samples = Some(body),
            _ => debug!("Skipping chunk '{}' ({len} bytes)", String::from_utf8_lossy(id)),
        }

        offset = body_start + len + (len & 1);
    }

    let format = format.ok_or_else(|| anyhow!("WAV file has no fmt chunk"))?;
    let samples = samples.ok_or_else(|| anyhow!("WAV file has no data chunk"))?;

    let sample_format = format.sample_format()?;
    let frame_size = sample_format.bytes_per_sample() * format.channels as usize;
    ensure!(
        format.block_align as usize == frame_size,
        "Block align {} does not match {} channel(s) of {sample_format}",
        format.block_align,
        format.channels
    );

    let usable = samples.len() - samples.len() % frame_size.max(1);
    if usable < samples.len() {
        warn!(
            "Dropping {} bytes of incomplete sample frame at end of data",
            samples.len() - usable
        );
    }

    let buffer = PcmBuffer::new(
        samples[..usable].to_vec(),
        sample_format,
        format.channels as usize,
        format.sample_rate,
    )?;

    debug!(
        "WAV: {} Hz, {} channel(s), {sample_format}, {} sample frames",
        format.sample_rate,
        format.channels,
        usable / frame_size.max(1)
    );

    Ok(WavFile { format, buffer })
}

/// RIFF/WAVE writer for 16-bit PCM.
pub struct WavWriter<W: Write + Seek> {
    writer: BufWriter<W>,
    sample_rate: u32,
    channels: u16,
    riff_size_position: u64,
    data_size_position: u64,
    data_written: u32,
}

impl<W: Write + Seek> WavWriter<W> {
    pub fn new(writer: W, sample_rate: u32, channels: u16) -> Self {
        Self {
            writer: BufWriter::new(writer),
            sample_rate,
            channels,
            riff_size_position: 0,
            data_size_position: 0,
            data_written: 0,
        }
    }

    pub fn write_header(&mut self) -> io::Result<()> {
        let block_align = self.channels * 2;
        let byte_rate = self.sample_rate * block_align as u32;

        self.riff_size_position = self.writer.stream_position()? + 4;
        self.writer.write_all(&join_bytes_le!(
            *b"RIFF",
            0u32, // patched in finish()
            *b"WAVE",
            *b"fmt ",
            16u32,
            WAVE_FORMAT_PCM,
            self.channels,
            self.sample_rate,
            byte_rate,
            block_align,
            16u16,
            *b"data",
        ))?;

        self.data_size_position = self.writer.stream_position()?;
        self.writer.write_all(&0u32.to_le_bytes())?;

        Ok(())
    }

    pub fn write_samples(&mut self, samples: &[i16]) -> io::Result<()> {
        let mut bytes = Vec::with_capacity(samples.len() * 2);
        samples.write_le(&mut bytes);
        self.writer.write_all(&bytes)?;
        self.data_written = self.data_written.saturating_add(bytes.len() as u32);
        Ok(())
    }

    /// Pads the data chunk and fills in the chunk sizes.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.data_written & 1 == 1 {
            self.writer.write_all(&[0])?;
        }
        self.writer.flush()?;

        let end = self.writer.stream_position()?;

        self.writer.seek(SeekFrom::Start(self.data_size_position))?;
        self.writer.write_all(&self.data_written.to_le_bytes())?;

        let riff_size = (end - self.riff_size_position - 4) as u32;
        self.writer.seek(SeekFrom::Start(self.riff_size_position))?;
        self.writer.write_all(&riff_size.to_le_bytes())?;

        self.writer.seek(SeekFrom::Start(end))?;
        self.writer.flush()?;

        Ok(())
    }

    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}
