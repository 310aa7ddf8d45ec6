//! Decodes synthesized LTC waveforms end to end.

use chrono::NaiveDate;
use ltc::process::derive::DerivedMetadata;
use ltc::process::encode::Encoder;
use ltc::process::recover::RecoveryParams;
use ltc::process::scan::{ScanConfig, Scanner, decode_at};
use ltc::process::validate::{Validator, ValidatorConfig};
use ltc::structs::frame::{DecodedFrame, LtcFrame};
use ltc::structs::sample_buffer::PcmBuffer;
use ltc::structs::timecode::Framerate;
use ltc::utils::date::FixedDate;
use ltc::utils::errors::ScanError;

const LEAD_IN: usize = 3137;

fn dated_frame(frames: u8) -> DecodedFrame {
    let mut frame = DecodedFrame::new(1, 2, 3, frames);
    frame.set_date_digits("24051700");
    frame
}

/// `LEAD_IN` samples of silence, then `count` consecutive frames.
fn render(sample_rate: u32, framerate: Framerate, first: &DecodedFrame, count: u8) -> Vec<f32> {
    let mut encoder = Encoder::new(sample_rate, framerate);
    let mut samples = encoder.render_silence(LEAD_IN);

    for i in 0..count {
        let mut frame = first.clone();
        frame.frames += i;
        samples.extend(encoder.render_frame(&LtcFrame::encode(&frame)));
    }
    samples.extend(encoder.render_silence(sample_rate as usize / 10));

    samples
}

#[test]
fn free_scan_and_anchored_decode_agree() -> anyhow::Result<()> {
    for sample_rate in [44100, 48000] {
        let samples = render(sample_rate, Framerate::R30, &dated_frame(4), 3);
        let buffer = PcmBuffer::from_f32(&samples, 1, sample_rate)?;

        let found = Scanner::new(&buffer, &ScanConfig::default())?.first_frame()?;
        assert_eq!(found.frame, dated_frame(4), "{sample_rate} Hz");
        assert!(found.sample_offset.abs_diff(LEAD_IN) <= 2, "{sample_rate} Hz");

        let anchored = decode_at(&buffer, 0, found.sample_offset, &RecoveryParams::anchored())?;
        assert_eq!(anchored.frame, found.frame, "{sample_rate} Hz");
    }

    Ok(())
}

#[test]
fn scan_yields_consecutive_frames() -> anyhow::Result<()> {
    let samples = render(44100, Framerate::R30, &dated_frame(10), 5);
    let buffer = PcmBuffer::from_f32(&samples, 1, 44100)?;

    let frames = Scanner::new(&buffer, &ScanConfig::default())?
        .map(|found| found.map(|found| found.frame.frames))
        .collect::<Result<Vec<_>, _>>()?;

    assert_eq!(frames, [10, 11, 12, 13, 14]);
    Ok(())
}

#[test]
fn integer_pcm_on_second_channel() -> anyhow::Result<()> {
    let ltc = render(48000, Framerate::R30, &dated_frame(4), 2);
    let interleaved = ltc
        .iter()
        .enumerate()
        .flat_map(|(i, &s)| {
            let hum = if i % 96 < 48 { 8000 } else { -8000 };
            [hum, (s * 32767.0) as i16]
        })
        .collect::<Vec<i16>>();
    let buffer = PcmBuffer::from_i16(&interleaved, 2, 48000)?;

    let config = ScanConfig {
        channel: 1,
        ..Default::default()
    };
    let found = Scanner::new(&buffer, &config)?.first_frame()?;
    assert_eq!(found.frame.to_string(), "01:02:03:04");

    let config = ScanConfig {
        channel: 0,
        ..Default::default()
    };
    assert!(Scanner::new(&buffer, &config)?.first_frame().is_err());
    Ok(())
}

#[test]
fn inverted_polarity() -> anyhow::Result<()> {
    let samples = render(48000, Framerate::R30, &dated_frame(4), 3)
        .into_iter()
        .map(|s| -s)
        .collect::<Vec<_>>();
    let buffer = PcmBuffer::from_f32(&samples, 1, 48000)?;

    // the first cell after silence has no visible edge, so the first whole
    // frame is the second one
    let found = Scanner::new(&buffer, &ScanConfig::default())?.first_frame()?;
    assert_eq!(found.frame, dated_frame(5));
    assert!(found.sample_offset.abs_diff(LEAD_IN + 1600) <= 2);
    Ok(())
}

#[test]
fn one_corrupted_sync_bit() -> anyhow::Result<()> {
    let mut bits = *LtcFrame::encode(&dated_frame(4)).bits();
    bits[72] = !bits[72];
    let frame = LtcFrame::from_bits(&bits).expect("80 bits");

    let mut encoder = Encoder::new(48000, Framerate::R30);
    let mut samples = encoder.render_silence(LEAD_IN);
    samples.extend(encoder.render_frame(&frame));
    samples.extend(encoder.render_silence(100));
    let buffer = PcmBuffer::from_f32(&samples, 1, 48000)?;

    let found = Scanner::new(&buffer, &ScanConfig::default())?.first_frame()?;
    assert_eq!(found.frame.sync_matches, 15);
    assert_eq!(found.frame.to_string(), "01:02:03:04");
    Ok(())
}

#[test]
fn slower_frame_rate_tracks_clock() -> anyhow::Result<()> {
    let samples = render(48000, Framerate::R25, &dated_frame(4), 3);
    let buffer = PcmBuffer::from_f32(&samples, 1, 48000)?;

    let found = Scanner::new(&buffer, &ScanConfig::default())?.first_frame()?;
    assert_eq!(found.frame, dated_frame(4));
    assert!(found.samples_per_bit > 20.0);
    Ok(())
}

#[test]
fn silence_reports_no_timecode() -> anyhow::Result<()> {
    let buffer = PcmBuffer::from_f32(&vec![0.0; 48000], 1, 48000)?;

    let result = Scanner::new(&buffer, &ScanConfig::default())?.first_frame();
    assert!(matches!(
        result,
        Err(ScanError::InsufficientBits { found: 0, .. })
    ));
    Ok(())
}

#[test]
fn metadata_from_signal() -> anyhow::Result<()> {
    let mut first = dated_frame(4);
    first.drop_frame = true;
    let samples = render(48000, Framerate::R29_97, &first, 2);
    let buffer = PcmBuffer::from_f32(&samples, 1, 48000)?;

    let found = Scanner::new(&buffer, &ScanConfig::default())?.first_frame()?;
    let framerate = Framerate::infer(found.frame.drop_frame);
    assert_eq!(framerate, Framerate::R29_97);

    let today = NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date");
    let validated = Validator::new(ValidatorConfig::for_decoded())
        .with_date_provider(FixedDate(today))
        .validate(&found.frame.to_raw(), framerate)?;
    assert!(validated.corrections.is_empty());

    let metadata = DerivedMetadata::derive(&validated.timecode, None, 48000);
    assert_eq!(metadata.origination_time, "01:02:03");
    assert_eq!(metadata.origination_date, "2024-05-17");
    // (3723 * 29.97 + 4) * 48000 / 29.97
    assert_eq!(metadata.time_reference, 178_710_406);

    let start = metadata.clone().anchored(found.sample_offset);
    assert_eq!(
        start.time_reference,
        metadata.time_reference - found.sample_offset as u64
    );
    Ok(())
}
