use std::fs::File;

use anyhow::{Context, Result, bail, ensure};
use chrono::NaiveDate;
use log::Level;
use ltc::process::encode::Encoder;
use ltc::process::validate::{Validator, ValidatorConfig};
use ltc::structs::frame::{DecodedFrame, LtcFrame};
use ltc::structs::timecode::{Framerate, RawDate, RawTimecode, Timecode};

use super::command::GenerateArgs;
use crate::wav::WavWriter;

pub fn cmd_generate(args: &GenerateArgs) -> Result<()> {
    ensure!(args.sample_rate > 0, "Sample rate must be non-zero");
    ensure!(args.duration > 0.0, "Duration must be positive");
    ensure!(
        args.amplitude > 0.0 && args.amplitude <= 1.0,
        "Amplitude must be in (0, 1]"
    );

    let framerate = args.fps.framerate().unwrap_or(Framerate::R30);

    let mut raw: RawTimecode = args.start.parse()?;
    raw.date = args.date.as_deref().map(str::parse::<RawDate>).transpose()?;

    let (start, mut frame) = start_frame(&raw, framerate)?;

    let frame_count = (args.duration * framerate.fps()).ceil() as usize;
    let mut encoder = Encoder::new(args.sample_rate, framerate).with_amplitude(args.amplitude);

    let file = File::create(&args.output)
        .with_context(|| format!("Cannot create {}", args.output.display()))?;
    let mut writer = WavWriter::new(file, args.sample_rate, 1);
    writer.write_header()?;
    writer.write_samples(&to_i16(&encoder.render_silence(args.offset)))?;

    for _ in 0..frame_count {
        writer.write_samples(&to_i16(&encoder.render_frame(&LtcFrame::encode(&frame))))?;
        frame.advance(framerate);
    }
    writer.finish()?;

    log::info!(
        "Wrote {frame_count} frames of {framerate} fps LTC from {} to {} ({} samples)",
        start,
        args.output.display(),
        encoder.position()
    );

    Ok(())
}

/// First frame to render. The start timecode must be written as given: any
/// correction is an error, and so is a frame number drop-frame counting skips.
fn start_frame(raw: &RawTimecode, framerate: Framerate) -> Result<(Timecode, DecodedFrame)> {
    let mut validator = Validator::new(ValidatorConfig::for_text());
    validator.set_fail_level(Level::Warn);
    let start = validator.validate(raw, framerate)?.timecode;

    let mut frame = DecodedFrame::new(start.hours, start.minutes, start.seconds, start.frames);
    frame.drop_frame = start.drop_frame;
    if frame.is_dropped(framerate) {
        bail!("Start timecode {frame} does not exist in drop-frame counting at {framerate} fps");
    }
    if raw.date.is_some() {
        frame.set_date_digits(&user_bit_date(start.date));
    }

    Ok((start, frame))
}

/// `YYMMDD00`, the user-bit date layout read back by the decoder.
fn user_bit_date(date: NaiveDate) -> String {
    date.format("%y%m%d00").to_string()
}

fn to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(text: &str, framerate: Framerate) -> Result<DecodedFrame> {
        let mut raw: RawTimecode = text.parse()?;
        raw.date = Some("2024-05-17".parse()?);
        Ok(start_frame(&raw, framerate)?.1)
    }

    #[test]
    fn user_bit_date_layout() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 17).expect("valid date");
        assert_eq!(user_bit_date(date), "24051700");
        assert_eq!(to_i16(&[0.5, -0.5, 0.0]), [16384, -16384, 0]);
    }

    #[test]
    fn start_frame_rejects_dropped_numbers() -> Result<()> {
        assert!(start("00:01:00;00", Framerate::R29_97).is_err());
        assert!(start("00:01:00;01", Framerate::R29_97).is_err());

        assert_eq!(start("00:01:00;02", Framerate::R29_97)?.to_string(), "00:01:00;02");
        assert_eq!(start("00:10:00;00", Framerate::R29_97)?.to_string(), "00:10:00;00");
        assert_eq!(start("00:01:00:00", Framerate::R30)?.to_string(), "00:01:00:00");

        let frame = start("10:00:00:00", Framerate::R30)?;
        assert_eq!(frame.date_digits().as_deref(), Some("24051700"));
        Ok(())
    }

    #[test]
    fn start_frame_rejects_corrections() {
        assert!(start("24:00:00:00", Framerate::R30).is_err());
        assert!(start("00:00:00:30", Framerate::R30).is_err());
    }
}
