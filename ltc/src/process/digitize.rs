use log::debug;

use crate::structs::sample_buffer::SampleBuffer;
use crate::utils::errors::FormatError;

/// Default cap on digitized samples, in seconds of audio.
pub const DEFAULT_MAX_SECONDS: f64 = 10.0;

/// Converts one channel of `buffer` into a polarity trace.
///
/// Starts at sample frame `start` and covers at most `max_samples` frames
/// (`None` for the rest of the stream). An entry is `true` iff the sample is
/// strictly greater than zero.
pub fn digitize<B: SampleBuffer + ?Sized>(
    buffer: &B,
    channel: usize,
    start: usize,
    max_samples: Option<usize>,
) -> Result<Vec<bool>, FormatError> {
    let channels = buffer.channels();
    if channel >= channels {
        return Err(FormatError::ChannelOutOfRange { channel, channels });
    }

    let end = match max_samples {
        Some(max) => buffer.frames().min(start.saturating_add(max)),
        None => buffer.frames(),
    };

    let trace = (start.min(end)..end)
        .map(|index| buffer.sample(index, channel) > 0.0)
        .collect::<Vec<_>>();

    debug!(
        "Digitized {} samples of channel {channel} ({}) starting at {start}",
        trace.len(),
        buffer.format()
    );

    Ok(trace)
}

/// Number of sample frames in `seconds` of audio at `sample_rate`.
pub fn samples_for_seconds(sample_rate: u32, seconds: f64) -> usize {
    (sample_rate as f64 * seconds).round().max(0.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::sample_buffer::PcmBuffer;

    #[test]
    fn strictly_positive_is_true() -> anyhow::Result<()> {
        let buffer = PcmBuffer::from_f32(&[0.5, 0.0, -0.5, 1e-6, -0.0], 1, 48000)?;
        assert_eq!(
            digitize(&buffer, 0, 0, None)?,
            vec![true, false, false, true, false]
        );
        Ok(())
    }

    #[test]
    fn honours_start_and_cap() -> anyhow::Result<()> {
        let buffer = PcmBuffer::from_i16(&[1, -1, 1, -1, 1, -1], 1, 48000)?;
        assert_eq!(digitize(&buffer, 0, 1, Some(3))?, vec![false, true, false]);
        assert_eq!(digitize(&buffer, 0, 4, Some(100))?, vec![true, false]);
        assert!(digitize(&buffer, 0, 10, None)?.is_empty());
        Ok(())
    }

    #[test]
    fn selects_channel() -> anyhow::Result<()> {
        let buffer = PcmBuffer::from_i16(&[1, -1, -1, 1], 2, 48000)?;
        assert_eq!(digitize(&buffer, 1, 0, None)?, vec![false, true]);
        assert_eq!(
            digitize(&buffer, 2, 0, None),
            Err(FormatError::ChannelOutOfRange {
                channel: 2,
                channels: 2
            })
        );
        Ok(())
    }

    #[test]
    fn cap_in_seconds() {
        assert_eq!(samples_for_seconds(48000, DEFAULT_MAX_SECONDS), 480_000);
        assert_eq!(samples_for_seconds(44100, 0.5), 22_050);
    }
}
