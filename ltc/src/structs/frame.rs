//! LTC frame layout
//!
//! An LTC frame is 80 bits transmitted least-significant bit first. Time
//! fields are BCD, interleaved with eight 4-bit user-bit groups, and the
//! frame ends with a 16-bit sync word:
//!
//! | Bits  | Content          | Bits  | Content          |
//! |-------|------------------|-------|------------------|
//! | 0-3   | frame units      | 40-42 | minute tens      |
//! | 4-7   | user group 1     | 43    | flag             |
//! | 8-9   | frame tens       | 44-47 | user group 6     |
//! | 10    | drop frame       | 48-51 | hour units       |
//! | 11    | color frame      | 52-55 | user group 7     |
//! | 12-15 | user group 2     | 56-57 | hour tens        |
//! | 16-19 | second units     | 58-59 | flags            |
//! | 20-23 | user group 3     | 60-63 | user group 8     |
//! | 24-26 | second tens      | 64-79 | sync word        |
//! | 27    | flag             |       |                  |
//! | 28-31 | user group 4     |       |                  |
//! | 32-35 | minute units     |       |                  |
//! | 36-39 | user group 5     |       |                  |

use std::fmt::{Display, Formatter};

use log::trace;

use crate::structs::timecode::{Framerate, RawDate, RawTimecode, YearDigits};
use crate::utils::bitstream_io::BsIoSliceReader;

pub const FRAME_BITS: usize = 80;

/// Bit index of the first sync word bit.
pub const SYNC_OFFSET: usize = 64;

/// The sync word `0011111111111101` in transmission order.
pub const SYNC_WORD: [bool; 16] = [
    false, false, true, true, true, true, true, true, true, true, true, true, true, true, false,
    true,
];

/// Minimum sync word matches accepted by a free-running scan.
pub const FREE_SCAN_SYNC_THRESHOLD: u8 = 15;

/// Minimum sync word matches accepted when decoding at a known offset.
pub const ANCHORED_SYNC_THRESHOLD: u8 = 14;

/// Counts how many of the 16 bits in `window` agree with [`SYNC_WORD`].
pub fn sync_matches(window: &[bool]) -> u8 {
    window
        .iter()
        .zip(SYNC_WORD.iter())
        .filter(|(bit, sync)| bit == sync)
        .count() as u8
}

/// Exactly 80 channel bits, bit 0 first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LtcFrame {
    bits: [bool; FRAME_BITS],
}

impl LtcFrame {
    /// Copies a frame out of a recovered bit sequence. `None` unless `bits`
    /// holds exactly 80 entries.
    pub fn from_bits(bits: &[bool]) -> Option<Self> {
        Some(Self {
            bits: bits.try_into().ok()?,
        })
    }

    pub fn bits(&self) -> &[bool; FRAME_BITS] {
        &self.bits
    }

    /// Packs the frame into 10 bytes, bit `i` at byte `i / 8`, position `i % 8`.
    pub fn to_bytes(&self) -> [u8; 10] {
        let mut bytes = [0u8; 10];
        for (i, &bit) in self.bits.iter().enumerate() {
            if bit {
                bytes[i >> 3] |= 1 << (i & 7);
            }
        }

        bytes
    }

    pub fn sync_matches(&self) -> u8 {
        sync_matches(&self.bits[SYNC_OFFSET..])
    }

    /// Decodes the time fields, flags and user bits.
    ///
    /// Returns `None` if fewer than `threshold` sync word bits match, so the
    /// decoder can be used on windows that did not go through the
    /// synchronizer.
    pub fn decode(&self, threshold: u8) -> Option<DecodedFrame> {
        let sync_matches = self.sync_matches();
        if sync_matches < threshold {
            trace!("Sync word check failed: {sync_matches}/16 < {threshold}");
            return None;
        }

        let bytes = self.to_bytes();
        let reader = &mut BsIoSliceReader::from_slice(&bytes);

        DecodedFrame::read(reader, sync_matches).ok()
    }

    /// Builds the 80-bit frame carrying `frame`'s fields and a clean sync word.
    pub fn encode(frame: &DecodedFrame) -> Self {
        let mut bits = [false; FRAME_BITS];
        let mut put = |start: usize, len: usize, value: u8| {
            for i in 0..len {
                bits[start + i] = (value >> i) & 1 != 0;
            }
        };

        let u = &frame.user_bits;
        put(0, 4, frame.frames % 10);
        put(4, 4, u[0]);
        put(8, 2, frame.frames / 10);
        put(10, 1, frame.drop_frame as u8);
        put(11, 1, frame.color_frame as u8);
        put(12, 4, u[1]);
        put(16, 4, frame.seconds % 10);
        put(20, 4, u[2]);
        put(24, 3, frame.seconds / 10);
        put(27, 1, frame.flag_bits & 1);
        put(28, 4, u[3]);
        put(32, 4, frame.minutes % 10);
        put(36, 4, u[4]);
        put(40, 3, frame.minutes / 10);
        put(43, 1, (frame.flag_bits >> 1) & 1);
        put(44, 4, u[5]);
        put(48, 4, frame.hours % 10);
        put(52, 4, u[6]);
        put(56, 2, frame.hours / 10);
        put(58, 2, (frame.flag_bits >> 2) & 3);
        put(60, 4, u[7]);

        bits[SYNC_OFFSET..].copy_from_slice(&SYNC_WORD);

        Self { bits }
    }
}

/// Fields extracted from one LTC frame, before range validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedFrame {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub frames: u8,
    pub drop_frame: bool,
    pub color_frame: bool,
    /// Bits 27, 43, 58 and 59 packed LSB-first. Their meaning (binary group
    /// flags, polarity correction) depends on the frame rate.
    pub flag_bits: u8,
    /// User-bit groups 1 to 8.
    pub user_bits: [u8; 8],
    /// Number of sync word bits (out of 16) that matched.
    pub sync_matches: u8,
}

impl Display for DecodedFrame {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}{}{:02}",
            self.hours,
            self.minutes,
            self.seconds,
            if self.drop_frame { ';' } else { ':' },
            self.frames
        )
    }
}

impl DecodedFrame {
    pub fn new(hours: u8, minutes: u8, seconds: u8, frames: u8) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            frames,
            sync_matches: 16,
            ..Default::default()
        }
    }

    fn read(reader: &mut BsIoSliceReader, sync_matches: u8) -> std::io::Result<Self> {
        let mut user_bits = [0u8; 8];

        let frame_units: u8 = reader.get_n(4)?;
        user_bits[0] = reader.get_n(4)?;
        let frame_tens: u8 = reader.get_n(2)?;
        let drop_frame = reader.get()?;
        let color_frame = reader.get()?;
        user_bits[1] = reader.get_n(4)?;

        let second_units: u8 = reader.get_n(4)?;
        user_bits[2] = reader.get_n(4)?;
        let second_tens: u8 = reader.get_n(3)?;
        let mut flag_bits = reader.get()? as u8;
        user_bits[3] = reader.get_n(4)?;

        let minute_units: u8 = reader.get_n(4)?;
        user_bits[4] = reader.get_n(4)?;
        let minute_tens: u8 = reader.get_n(3)?;
        flag_bits |= (reader.get()? as u8) << 1;
        user_bits[5] = reader.get_n(4)?;

        let hour_units: u8 = reader.get_n(4)?;
        user_bits[6] = reader.get_n(4)?;
        let hour_tens: u8 = reader.get_n(2)?;
        flag_bits |= reader.get_n::<u8>(2)? << 2;
        user_bits[7] = reader.get_n(4)?;

        let frame = Self {
            hours: hour_tens * 10 + hour_units,
            minutes: minute_tens * 10 + minute_units,
            seconds: second_tens * 10 + second_units,
            frames: frame_tens * 10 + frame_units,
            drop_frame,
            color_frame,
            flag_bits,
            user_bits,
            sync_matches,
        };

        trace!(
            "LTC frame: {frame}{}{} user bits {:?}, sync {}/16",
            if frame.drop_frame { " DF" } else { "" },
            if frame.color_frame { " CF" } else { "" },
            frame.user_bits,
            sync_matches
        );

        Ok(frame)
    }

    /// User-bit groups 8 to 1 as decimal digits (`YYMMDDXX`), or `None` if a
    /// group holds a nibble above 9.
    pub fn date_digits(&self) -> Option<String> {
        self.user_bits
            .iter()
            .rev()
            .map(|&nibble| char::from_digit(nibble as u32, 10))
            .collect()
    }

    /// Stores `digits` (up to 8 decimal digits, group 8 first) in the user bits.
    pub fn set_date_digits(&mut self, digits: &str) {
        self.user_bits = [0; 8];
        for (i, digit) in digits.chars().take(8).enumerate() {
            self.user_bits[7 - i] = digit.to_digit(10).unwrap_or(0) as u8;
        }
    }

    /// The recording date carried in the user bits, not yet range-checked.
    pub fn raw_date(&self) -> Option<RawDate> {
        let digits = self.date_digits()?;
        let field = |range: std::ops::Range<usize>| digits[range].parse::<u8>().ok();

        Some(RawDate {
            year: YearDigits::Two(field(0..2)?),
            month: field(2..4)?,
            day: field(4..6)?,
        })
    }

    /// Whether drop-frame counting skips this frame number: frames 0 and 1 at
    /// the start of every minute not divisible by ten, on 30-frame rates.
    pub fn is_dropped(&self, framerate: Framerate) -> bool {
        self.drop_frame
            && framerate.nominal() == 30
            && self.seconds == 0
            && self.minutes % 10 != 0
            && self.frames < 2
    }

    /// Steps to the next frame at `framerate`, wrapping at 24 hours.
    ///
    /// With the drop-frame flag set on a 30-frame rate, frame numbers 0 and 1
    /// are skipped at the start of every minute not divisible by ten.
    pub fn advance(&mut self, framerate: Framerate) {
        self.frames += 1;
        if self.frames < framerate.nominal() {
            return;
        }

        self.frames = 0;
        self.seconds += 1;
        if self.seconds >= 60 {
            self.seconds = 0;
            self.minutes += 1;
        }
        if self.minutes >= 60 {
            self.minutes = 0;
            self.hours += 1;
        }
        if self.hours >= 24 {
            self.hours = 0;
        }

        if self.is_dropped(framerate) {
            self.frames = 2;
        }
    }

    pub fn to_raw(&self) -> RawTimecode {
        RawTimecode {
            hours: self.hours,
            minutes: self.minutes,
            seconds: self.seconds,
            frames: self.frames,
            drop_frame: self.drop_frame,
            color_frame: self.color_frame,
            date: self.raw_date(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> DecodedFrame {
        let mut frame = DecodedFrame::new(23, 59, 58, 29);
        frame.drop_frame = true;
        frame.color_frame = true;
        frame.flag_bits = 0b1010;
        frame.user_bits = [1, 2, 3, 4, 5, 6, 7, 8];
        frame
    }

    #[test]
    fn decode_recovers_encoded_fields() {
        let original = sample_frame();
        let decoded = LtcFrame::encode(&original)
            .decode(FREE_SCAN_SYNC_THRESHOLD)
            .unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn decode_01_02_03_04() {
        let decoded = LtcFrame::encode(&DecodedFrame::new(1, 2, 3, 4))
            .decode(FREE_SCAN_SYNC_THRESHOLD)
            .unwrap();

        assert_eq!(
            (decoded.hours, decoded.minutes, decoded.seconds, decoded.frames),
            (1, 2, 3, 4)
        );
        assert!(!decoded.drop_frame);
        assert_eq!(format!("{decoded}"), "01:02:03:04");
    }

    #[test]
    fn field_bit_positions() {
        let frame = LtcFrame::encode(&DecodedFrame::new(0, 0, 0, 1));
        assert!(frame.bits()[0]);
        assert!(frame.bits()[1..SYNC_OFFSET].iter().all(|&b| !b));

        let mut df = DecodedFrame::new(20, 0, 0, 0);
        df.drop_frame = true;
        let frame = LtcFrame::encode(&df);
        assert!(frame.bits()[10]);
        assert!(frame.bits()[57]);
        assert!(!frame.bits()[56]);
    }

    #[test]
    fn sync_word_bytes() {
        let bytes = LtcFrame::encode(&DecodedFrame::default()).to_bytes();
        assert_eq!(bytes[8], 0xFC);
        assert_eq!(bytes[9], 0xBF);
    }

    #[test]
    fn corrupted_sync_word() {
        let mut bits = *LtcFrame::encode(&DecodedFrame::new(1, 2, 3, 4)).bits();

        bits[70] = !bits[70];
        let one_error = LtcFrame::from_bits(&bits).unwrap();
        assert_eq!(one_error.sync_matches(), 15);
        assert_eq!(one_error.decode(FREE_SCAN_SYNC_THRESHOLD).unwrap().sync_matches, 15);

        bits[71] = !bits[71];
        let two_errors = LtcFrame::from_bits(&bits).unwrap();
        assert!(two_errors.decode(FREE_SCAN_SYNC_THRESHOLD).is_none());
        assert!(two_errors.decode(ANCHORED_SYNC_THRESHOLD).is_some());

        bits[79] = !bits[79];
        let three_errors = LtcFrame::from_bits(&bits).unwrap();
        assert!(three_errors.decode(ANCHORED_SYNC_THRESHOLD).is_none());
    }

    #[test]
    fn user_bit_date() {
        let mut frame = DecodedFrame::new(10, 0, 0, 0);
        frame.set_date_digits("24051700");
        assert_eq!(frame.user_bits, [0, 0, 7, 1, 5, 0, 4, 2]);
        assert_eq!(frame.date_digits().as_deref(), Some("24051700"));
        assert_eq!(
            frame.raw_date(),
            Some(RawDate {
                year: YearDigits::Two(24),
                month: 5,
                day: 17
            })
        );

        frame.user_bits[7] = 0xA;
        assert_eq!(frame.date_digits(), None);
        assert_eq!(frame.raw_date(), None);
    }

    #[test]
    fn advance_counts_frames() {
        let mut frame = DecodedFrame::new(0, 0, 59, 29);
        frame.advance(Framerate::R30);
        assert_eq!(frame.to_string(), "00:01:00:00");

        let mut frame = DecodedFrame::new(23, 59, 59, 24);
        frame.advance(Framerate::R25);
        assert_eq!(frame.to_string(), "00:00:00:00");

        let mut frame = DecodedFrame::new(0, 0, 59, 29);
        frame.drop_frame = true;
        frame.advance(Framerate::R29_97);
        assert_eq!(frame.to_string(), "00:01:00;02");

        let mut frame = DecodedFrame::new(0, 9, 59, 29);
        frame.drop_frame = true;
        frame.advance(Framerate::R29_97);
        assert_eq!(frame.to_string(), "00:10:00;00");
    }

    #[test]
    fn dropped_frame_numbers() {
        let mut frame = DecodedFrame::new(0, 1, 0, 0);
        assert!(!frame.is_dropped(Framerate::R29_97));

        frame.drop_frame = true;
        assert!(frame.is_dropped(Framerate::R29_97));
        assert!(!frame.is_dropped(Framerate::R25));

        frame.frames = 2;
        assert!(!frame.is_dropped(Framerate::R29_97));

        let mut tenth = DecodedFrame::new(0, 10, 0, 1);
        tenth.drop_frame = true;
        assert!(!tenth.is_dropped(Framerate::R29_97));
    }

    #[test]
    fn from_bits_requires_80() {
        assert!(LtcFrame::from_bits(&[false; 79]).is_none());
        assert!(LtcFrame::from_bits(&[false; 81]).is_none());
    }
}
