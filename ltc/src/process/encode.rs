use crate::structs::frame::{FRAME_BITS, LtcFrame};
use crate::structs::timecode::Framerate;

/// Renders LTC frames as a biphase-mark waveform.
///
/// Every bit starts with a level change and a "1" changes level again half
/// way through. Bit boundaries are placed on the nearest sample of an exact
/// fractional clock, so rates whose bit period is not a whole number of
/// samples (44.1 kHz, 29.97 fps) do not drift.
#[derive(Debug, Clone)]
pub struct Encoder {
    samples_per_bit: f64,
    amplitude: f32,
    level: bool,
    clock: f64,
    written: usize,
}

impl Encoder {
    pub fn new(sample_rate: u32, framerate: Framerate) -> Self {
        Self {
            samples_per_bit: sample_rate as f64 / (framerate.fps() * FRAME_BITS as f64),
            amplitude: 0.5,
            level: false,
            clock: 0.0,
            written: 0,
        }
    }

    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude.abs();
        self
    }

    /// Samples rendered so far; the next frame's bit 0 starts here.
    pub fn position(&self) -> usize {
        self.written
    }

    pub fn render_frame(&mut self, frame: &LtcFrame) -> Vec<f32> {
        let mut out = Vec::with_capacity((self.samples_per_bit * FRAME_BITS as f64).ceil() as usize);

        for &bit in frame.bits() {
            let start = self.clock;
            let end = start + self.samples_per_bit;

            self.level = !self.level;
            if bit {
                self.fill(&mut out, start + self.samples_per_bit / 2.0);
                self.level = !self.level;
            }
            self.fill(&mut out, end);

            self.clock = end;
        }

        out
    }

    /// Zero-valued samples. The next frame starts on a rising edge.
    pub fn render_silence(&mut self, samples: usize) -> Vec<f32> {
        self.written += samples;
        self.clock = self.written as f64;
        self.level = false;

        vec![0.0; samples]
    }

    fn fill(&mut self, out: &mut Vec<f32>, until: f64) {
        let value = if self.level { self.amplitude } else { -self.amplitude };
        let target = until.round() as usize;
        if target > self.written {
            out.extend(std::iter::repeat_n(value, target - self.written));
            self.written = target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::frame::DecodedFrame;

    #[test]
    fn frame_length() {
        let frame = LtcFrame::encode(&DecodedFrame::new(0, 0, 0, 0));

        let mut encoder = Encoder::new(48000, Framerate::R30);
        assert_eq!(encoder.render_frame(&frame).len(), 1600);
        assert_eq!(encoder.position(), 1600);

        let mut encoder = Encoder::new(44100, Framerate::R30);
        let samples = [encoder.render_frame(&frame), encoder.render_frame(&frame)].concat();
        assert_eq!(samples.len(), 2940);
    }

    #[test]
    fn biphase_mark_levels() {
        let mut bits = [false; FRAME_BITS];
        bits[1] = true;
        let frame = LtcFrame::from_bits(&bits).unwrap();

        let mut encoder = Encoder::new(48000, Framerate::R30);
        let mut samples = encoder.render_silence(5);
        samples.extend(encoder.render_frame(&frame));

        assert!(samples[..5].iter().all(|&s| s == 0.0));
        // bit 0: rising edge, full period high
        assert!(samples[5..25].iter().all(|&s| s == 0.5));
        // bit 1: low half, then high half
        assert!(samples[25..35].iter().all(|&s| s == -0.5));
        assert!(samples[35..45].iter().all(|&s| s == 0.5));
        // bit 2
        assert!(samples[45..65].iter().all(|&s| s == -0.5));
    }

    #[test]
    fn amplitude() {
        let frame = LtcFrame::encode(&DecodedFrame::new(0, 0, 0, 0));
        let samples = Encoder::new(48000, Framerate::R25)
            .with_amplitude(-0.25)
            .render_frame(&frame);

        assert_eq!(samples.len(), 1920);
        assert!(samples.iter().all(|&s| s == 0.25 || s == -0.25));
        assert!(samples.contains(&-0.25));
    }
}
