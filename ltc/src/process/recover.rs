use log::debug;

use crate::structs::frame::{ANCHORED_SYNC_THRESHOLD, FRAME_BITS, FREE_SCAN_SYNC_THRESHOLD};

/// LTC channel bit rate assumed for the initial bit period estimate.
pub const NOMINAL_BIT_RATE: f64 = 2400.0;

/// Bits recovered per free-scan window.
pub const FREE_SCAN_BIT_BUDGET: usize = 1000;

/// Parameters of one bit recovery pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoveryParams {
    /// Recovery stops once this many bits have been emitted.
    pub target_bits: usize,
    /// Exponential smoothing factor applied to the bit period on every
    /// full-bit interval.
    pub smoothing: f64,
    /// Minimum sync word matches (out of 16) for a frame to be accepted.
    pub sync_threshold: u8,
}

impl RecoveryParams {
    /// Long free-running search for the first frame in a stream.
    pub const fn free_scan() -> Self {
        Self {
            target_bits: FREE_SCAN_BIT_BUDGET,
            smoothing: 0.01,
            sync_threshold: FREE_SCAN_SYNC_THRESHOLD,
        }
    }

    /// Exactly one frame decoded from a known start offset.
    pub const fn anchored() -> Self {
        Self {
            target_bits: FRAME_BITS,
            smoothing: 0.05,
            sync_threshold: ANCHORED_SYNC_THRESHOLD,
        }
    }
}

impl Default for RecoveryParams {
    fn default() -> Self {
        Self::free_scan()
    }
}

/// Running estimate of the channel bit period, in samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitClock {
    samples_per_bit: f64,
}

impl BitClock {
    pub fn nominal(sample_rate: u32) -> Self {
        Self::with_samples_per_bit(sample_rate as f64 / NOMINAL_BIT_RATE)
    }

    pub fn with_samples_per_bit(samples_per_bit: f64) -> Self {
        Self { samples_per_bit }
    }

    pub fn samples_per_bit(&self) -> f64 {
        self.samples_per_bit
    }

    #[inline(always)]
    fn classify(&self, elapsed: f64) -> Interval {
        if elapsed < 1.5 * self.samples_per_bit / 2.0 {
            Interval::Half
        } else if elapsed < 1.5 * self.samples_per_bit {
            Interval::Full
        } else {
            Interval::Spurious
        }
    }

    #[inline(always)]
    fn update(&mut self, elapsed: f64, smoothing: f64) {
        self.samples_per_bit = self.samples_per_bit * (1.0 - smoothing) + elapsed * smoothing;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interval {
    Half,
    Full,
    Spurious,
}

/// Output of [`recover_bits`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveredBits {
    pub bits: Vec<bool>,
    /// Trace index of the transition that opened each bit.
    pub starts: Vec<usize>,
    /// Bit period estimate after the last interval.
    pub clock: BitClock,
}

impl RecoveredBits {
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}

struct BitSink {
    bits: Vec<bool>,
    starts: Vec<usize>,
    target: usize,
}

impl BitSink {
    fn push(&mut self, bit: bool, start: usize) {
        if !self.is_full() {
            self.bits.push(bit);
            self.starts.push(start);
        }
    }

    fn is_full(&self) -> bool {
        self.bits.len() >= self.target
    }
}

/// Biphase-mark decodes a polarity trace.
///
/// A transition after about half a bit period is half of a "1" (two halves
/// make the bit), one after about a full period is a "0", and anything longer
/// is discarded. `clock` is the starting bit period estimate; the adapted
/// estimate is returned with the bits. Never fails: a sequence shorter than
/// `params.target_bits` means the trace ran out.
pub fn recover_bits(trace: &[bool], clock: BitClock, params: &RecoveryParams) -> RecoveredBits {
    let mut clock = clock;
    let mut sink = BitSink {
        bits: Vec::with_capacity(params.target_bits.min(trace.len())),
        starts: Vec::with_capacity(params.target_bits.min(trace.len())),
        target: params.target_bits,
    };

    let mut last_transition = 0;
    let mut pending_half_bit: Option<usize> = None;

    for i in 1..trace.len() {
        if sink.is_full() {
            break;
        }
        if trace[i] == trace[i - 1] {
            continue;
        }

        let elapsed = (i - last_transition) as f64;
        match clock.classify(elapsed) {
            Interval::Half => match pending_half_bit.take() {
                Some(start) => sink.push(true, start),
                None => pending_half_bit = Some(last_transition),
            },
            Interval::Full => {
                if let Some(start) = pending_half_bit.take() {
                    sink.push(true, start);
                }
                sink.push(false, last_transition);
                clock.update(elapsed, params.smoothing);
            }
            Interval::Spurious => {
                if let Some(start) = pending_half_bit.take() {
                    sink.push(true, start);
                }
            }
        }

        last_transition = i;
    }

    if let Some(start) = pending_half_bit {
        sink.push(true, start);
    }

    debug!(
        "Recovered {} bits from {} samples, bit period {:.3} samples",
        sink.bits.len(),
        trace.len(),
        clock.samples_per_bit()
    );

    RecoveredBits {
        bits: sink.bits,
        starts: sink.starts,
        clock,
    }
}
