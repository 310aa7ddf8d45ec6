use log::debug;
use serde::Serialize;

use crate::structs::timecode::{Framerate, Timecode};

/// Frames elapsed since midnight, `(h*3600 + m*60 + s) * fps + f`.
///
/// Fractional for 29.97 and 23.976; drop-frame counting is not applied.
pub fn total_frames(timecode: &Timecode, framerate: Framerate) -> f64 {
    timecode.seconds_of_day() as f64 * framerate.fps() + timecode.frames as f64
}

/// Samples elapsed since midnight, rounded to the nearest sample.
pub fn time_reference_samples(timecode: &Timecode, framerate: Framerate, sample_rate: u32) -> u64 {
    (total_frames(timecode, framerate) * sample_rate as f64 / framerate.fps()).round() as u64
}

/// Broadcast-style timing metadata for a recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedMetadata {
    /// Samples since midnight at the reference point.
    pub time_reference: u64,
    /// `HH:MM:SS`
    pub origination_time: String,
    /// `YYYY-MM-DD`
    pub origination_date: String,
    pub framerate: Framerate,
    pub sample_rate: u32,
}

impl DerivedMetadata {
    /// Derives metadata for the sample at which `timecode` was read.
    ///
    /// Without an explicit `framerate` it is inferred from the drop-frame
    /// flag.
    pub fn derive(timecode: &Timecode, framerate: Option<Framerate>, sample_rate: u32) -> Self {
        let framerate = framerate.unwrap_or_else(|| Framerate::infer(timecode.drop_frame));
        let time_reference = time_reference_samples(timecode, framerate, sample_rate);

        debug!(
            "{timecode} at {framerate} fps, {sample_rate} Hz: {:.3} frames, time reference {time_reference}",
            total_frames(timecode, framerate)
        );

        Self {
            time_reference,
            origination_time: format!(
                "{:02}:{:02}:{:02}",
                timecode.hours, timecode.minutes, timecode.seconds
            ),
            origination_date: timecode.date.format("%Y-%m-%d").to_string(),
            framerate,
            sample_rate,
        }
    }

    /// Moves the reference point from the frame to sample 0 of the stream the
    /// frame was found at `frame_sample_offset` in.
    pub fn anchored(mut self, frame_sample_offset: usize) -> Self {
        self.time_reference = self
            .time_reference
            .saturating_sub(frame_sample_offset as u64);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn tc(hours: u8, minutes: u8, seconds: u8, frames: u8) -> Timecode {
        Timecode {
            hours,
            minutes,
            seconds,
            frames,
            drop_frame: false,
            color_frame: false,
            date: NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(),
        }
    }

    #[test]
    fn one_second_at_48k() {
        assert_eq!(time_reference_samples(&tc(0, 0, 1, 0), Framerate::R30, 48000), 48000);
    }

    #[test]
    fn one_minute_at_29_97() {
        let minute = tc(0, 1, 0, 0);
        approx::assert_abs_diff_eq!(total_frames(&minute, Framerate::R29_97), 1798.2, epsilon = 1e-9);
        assert_eq!(time_reference_samples(&minute, Framerate::R29_97, 48000), 2_880_000);
    }

    #[test]
    fn monotonic() {
        let timecodes = [
            tc(0, 0, 0, 0),
            tc(0, 0, 0, 1),
            tc(0, 0, 0, 23),
            tc(0, 0, 1, 0),
            tc(0, 59, 59, 23),
            tc(1, 0, 0, 0),
            tc(23, 59, 59, 23),
        ];

        // frame numbers stay below the smallest nominal rate
        for rate in [Framerate::R23_976, Framerate::R25, Framerate::R29_97, Framerate::R30] {
            let references = timecodes
                .iter()
                .map(|t| time_reference_samples(t, rate, 48000))
                .collect::<Vec<_>>();
            assert!(references.windows(2).all(|w| w[0] <= w[1]), "{rate}");
        }
    }

    #[test]
    fn derive_and_anchor() {
        let mut timecode = tc(1, 2, 3, 4);
        timecode.drop_frame = true;

        let metadata = DerivedMetadata::derive(&timecode, None, 48000);
        assert_eq!(metadata.framerate, Framerate::R29_97);
        assert_eq!(metadata.origination_time, "01:02:03");
        assert_eq!(metadata.origination_date, "2024-05-17");

        let explicit = DerivedMetadata::derive(&timecode, Some(Framerate::R25), 48000);
        assert_eq!(explicit.time_reference, 3723 * 48000 + 4 * 1920);

        let anchored = explicit.clone().anchored(48000);
        assert_eq!(anchored.time_reference, explicit.time_reference - 48000);
        assert_eq!(explicit.anchored(usize::MAX).time_reference, 0);
    }
}
