use anyhow::Result;
use log::{debug, info, trace};

use crate::process::digitize::{DEFAULT_MAX_SECONDS, digitize, samples_for_seconds};
use crate::process::recover::{BitClock, RecoveryParams, recover_bits};
use crate::process::synchronize::{candidate_offsets, find_frame};
use crate::structs::frame::{DecodedFrame, FRAME_BITS, LtcFrame};
use crate::structs::sample_buffer::SampleBuffer;
use crate::utils::errors::{FormatError, ScanError};

/// Settings for a free scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Channel carrying the LTC signal.
    pub channel: usize,
    /// Sample frame at which scanning starts.
    pub start: usize,
    /// Cap on the digitized span in seconds, `None` for the whole stream.
    pub max_seconds: Option<f64>,
    pub params: RecoveryParams,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            channel: 0,
            start: 0,
            max_seconds: Some(DEFAULT_MAX_SECONDS),
            params: RecoveryParams::free_scan(),
        }
    }
}

/// A decoded frame and where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct FoundFrame {
    pub frame: DecodedFrame,
    pub bits: LtcFrame,
    /// Sample frame at which bit 0 of the LTC frame starts.
    pub sample_offset: usize,
    /// Bit period estimate at the end of the window that held the frame.
    pub samples_per_bit: f64,
}

/// Searches a sample stream for LTC frames.
///
/// The selected channel is digitized once up front; the polarity trace is
/// then decoded in windows of `params.target_bits` bits, each with a fresh
/// bit clock. A window that holds no sync word hands its last 79 bits to the
/// next one so a frame straddling the boundary is not lost. After a frame is
/// found, scanning resumes at the bit following it.
///
/// Yields every frame found in order. If the trace runs out before a single
/// frame was found, yields one [`ScanError`] and stops.
///
/// # Example
///
/// ```rust,no_run
/// use ltc::process::scan::{ScanConfig, Scanner};
/// use ltc::structs::sample_buffer::PcmBuffer;
///
/// # let samples = vec![0.0f32; 48000];
/// let buffer = PcmBuffer::from_f32(&samples, 1, 48000)?;
/// let mut scanner = Scanner::new(&buffer, &ScanConfig::default())?;
///
/// match scanner.first_frame() {
///     Ok(found) => println!("{} at sample {}", found.frame, found.sample_offset),
///     Err(e) => println!("no timecode: {e}"),
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Scanner {
    trace: Vec<bool>,
    origin: usize,
    sample_rate: u32,
    params: RecoveryParams,
    position: usize,
    windows: usize,
    bits_recovered: usize,
    offsets_tried: usize,
    frames_found: usize,
    done: bool,
}

impl Scanner {
    pub fn new<B: SampleBuffer + ?Sized>(buffer: &B, config: &ScanConfig) -> Result<Self, FormatError> {
        let max_samples = config
            .max_seconds
            .map(|seconds| samples_for_seconds(buffer.sample_rate(), seconds));
        let trace = digitize(buffer, config.channel, config.start, max_samples)?;

        Ok(Self {
            trace,
            origin: config.start,
            sample_rate: buffer.sample_rate(),
            params: config.params,
            position: 0,
            windows: 0,
            bits_recovered: 0,
            offsets_tried: 0,
            frames_found: 0,
            done: false,
        })
    }

    /// The first frame in the stream.
    pub fn first_frame(&mut self) -> Result<FoundFrame, ScanError> {
        self.next().unwrap_or_else(|| {
            Err(ScanError::NoSyncFound {
                bits: self.bits_recovered,
                offsets: self.offsets_tried,
                windows: self.windows,
            })
        })
    }

    /// Trace samples consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn trace_len(&self) -> usize {
        self.trace.len()
    }

    pub fn windows(&self) -> usize {
        self.windows
    }

    fn exhausted(&mut self) -> Option<Result<FoundFrame, ScanError>> {
        self.done = true;
        if self.frames_found > 0 {
            return None;
        }

        let error = if self.bits_recovered < FRAME_BITS {
            ScanError::InsufficientBits {
                found: self.bits_recovered,
                expected: FRAME_BITS,
            }
        } else {
            ScanError::NoSyncFound {
                bits: self.bits_recovered,
                offsets: self.offsets_tried,
                windows: self.windows,
            }
        };
        debug!("Scan finished without a frame: {error}");

        Some(Err(error))
    }
}

impl Iterator for Scanner {
    type Item = Result<FoundFrame, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            if self.position >= self.trace.len() {
                return self.exhausted();
            }

            let window = &self.trace[self.position..];
            let recovered = recover_bits(window, BitClock::nominal(self.sample_rate), &self.params);
            self.windows += 1;
            self.bits_recovered += recovered.len();
            self.offsets_tried += candidate_offsets(recovered.len());

            trace!(
                "Window {} at trace sample {}: {} bits",
                self.windows,
                self.position,
                recovered.len()
            );

            let budget_reached = recovered.len() >= self.params.target_bits;

            let hit = find_frame(&recovered.bits, self.params.sync_threshold)
                .ok()
                .and_then(|found| Some((found.frame.decode(self.params.sync_threshold)?, found)));

            if let Some((frame, found)) = hit {
                let sample_offset = self.origin + self.position + recovered.starts[found.offset];
                let end = found.offset + FRAME_BITS;

                match recovered.starts.get(end) {
                    Some(&next) => self.position += next,
                    None if budget_reached => self.position += recovered.starts[end - 1] + 1,
                    None => self.done = true,
                }
                self.frames_found += 1;

                info!(
                    "Found LTC frame {frame} at sample {sample_offset} (sync {}/16)",
                    frame.sync_matches
                );

                return Some(Ok(FoundFrame {
                    frame,
                    bits: found.frame,
                    sample_offset,
                    samples_per_bit: recovered.clock.samples_per_bit(),
                }));
            }

            if !budget_reached {
                return self.exhausted();
            }

            let keep = recovered.len().saturating_sub(FRAME_BITS - 1);
            let step = recovered.starts.get(keep).copied().unwrap_or(0).max(1);
            self.position = (self.position + step).min(self.trace.len());
        }
    }
}

/// Decodes exactly one frame whose bit 0 starts at `sample_offset`.
///
/// Digitizes about two frames' worth of samples from the offset, recovers
/// bits with a fresh bit clock and checks the sync word at
/// `params.sync_threshold`.
///
/// An offset a few samples before the frame leaves a fragment of the previous
/// bit cell at the start of the trace, which recovers as one extra leading
/// bit. The frame is then taken from bit 1 and its start moved to the first
/// edge in the trace.
pub fn decode_at<B: SampleBuffer + ?Sized>(
    buffer: &B,
    channel: usize,
    sample_offset: usize,
    params: &RecoveryParams,
) -> Result<FoundFrame> {
    let frames = buffer.frames();
    if sample_offset >= frames {
        return Err(ScanError::OffsetOutOfRange {
            offset: sample_offset,
            frames,
        }
        .into());
    }

    let params = RecoveryParams {
        target_bits: params.target_bits.max(FRAME_BITS + 1),
        ..*params
    };
    let clock = BitClock::nominal(buffer.sample_rate());
    let span = (clock.samples_per_bit() * (2 * params.target_bits) as f64).ceil() as usize;
    let trace = digitize(buffer, channel, sample_offset, Some(span))?;

    let recovered = recover_bits(&trace, clock, &params);
    if recovered.len() < FRAME_BITS {
        return Err(ScanError::InsufficientBits {
            found: recovered.len(),
            expected: FRAME_BITS,
        }
        .into());
    }

    let searched = &recovered.bits[..recovered.len().min(FRAME_BITS + 1)];
    let found = find_frame(searched, params.sync_threshold)?;
    let frame = found
        .frame
        .decode(params.sync_threshold)
        .ok_or(ScanError::NoSyncFound {
            bits: searched.len(),
            offsets: candidate_offsets(searched.len()),
            windows: 1,
        })?;

    let start = if found.offset == 0 {
        recovered.starts[0]
    } else {
        trace
            .windows(2)
            .position(|pair| pair[0] != pair[1])
            .map_or(recovered.starts[found.offset], |edge| edge + 1)
    };

    debug!(
        "Anchored decode at sample {sample_offset}: {frame} (bit offset {}, starts at sample {})",
        found.offset,
        sample_offset + start
    );

    Ok(FoundFrame {
        frame,
        bits: found.frame,
        sample_offset: sample_offset + start,
        samples_per_bit: recovered.clock.samples_per_bit(),
    })
}
