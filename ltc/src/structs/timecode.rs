//! SMPTE timecode structures
//!
//! [`RawTimecode`] is the common, unvalidated form produced both by the LTC
//! field decoder and by parsing timecode text. The
//! [`Validator`](crate::process::validate::Validator) turns it into a
//! [`Timecode`] with every field in range and a calendar date attached.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::utils::errors::TimecodeError;

/// Year as it was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearDigits {
    /// Two-digit year, century to be decided by a
    /// [`CenturyPolicy`](crate::utils::date::CenturyPolicy).
    Two(u8),
    Four(u16),
}

/// Calendar date before range checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawDate {
    pub year: YearDigits,
    pub month: u8,
    pub day: u8,
}

impl Display for RawDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.year {
            YearDigits::Two(y) => write!(f, "{y:02}-{:02}-{:02}", self.month, self.day),
            YearDigits::Four(y) => write!(f, "{y:04}-{:02}-{:02}", self.month, self.day),
        }
    }
}

impl FromStr for RawDate {
    type Err = TimecodeError;

    /// Accepts `YYYY-MM-DD` and `YYMMDD`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || TimecodeError::InvalidDateText(s.to_string());
        let s = s.trim();

        if !s.chars().all(|c| c.is_ascii_digit() || c == '-') {
            return Err(err());
        }

        let parts = s.split('-').collect::<Vec<_>>();
        match parts.as_slice() {
            [y, m, d] if y.len() == 4 && m.len() == 2 && d.len() == 2 => Ok(Self {
                year: YearDigits::Four(y.parse().map_err(|_| err())?),
                month: m.parse().map_err(|_| err())?,
                day: d.parse().map_err(|_| err())?,
            }),
            [compact] if compact.len() == 6 => Ok(Self {
                year: YearDigits::Two(compact[0..2].parse().map_err(|_| err())?),
                month: compact[2..4].parse().map_err(|_| err())?,
                day: compact[4..6].parse().map_err(|_| err())?,
            }),
            _ => Err(err()),
        }
    }
}

/// Timecode fields before range checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTimecode {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub frames: u8,
    pub drop_frame: bool,
    pub color_frame: bool,
    pub date: Option<RawDate>,
}

impl FromStr for RawTimecode {
    type Err = TimecodeError;

    /// Accepts `HH:MM:SS:FF`; a `;` or `.` before `FF` marks drop-frame.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || TimecodeError::InvalidTimecodeText(s.to_string());
        let s = s.trim();

        let split = s.rfind([':', ';', '.']).ok_or_else(err)?;
        let drop_frame = s[split..].starts_with([';', '.']);

        let fields = s[..split]
            .split(':')
            .chain(std::iter::once(&s[split + 1..]))
            .map(|field| {
                if field.is_empty() || field.len() > 2 {
                    return Err(err());
                }
                field.parse::<u8>().map_err(|_| err())
            })
            .collect::<Result<Vec<_>, _>>()?;

        let [hours, minutes, seconds, frames] = fields[..] else {
            return Err(err());
        };

        Ok(Self {
            hours,
            minutes,
            seconds,
            frames,
            drop_frame,
            color_frame: false,
            date: None,
        })
    }
}

/// Timecode with every field in range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timecode {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub frames: u8,
    pub drop_frame: bool,
    pub color_frame: bool,
    pub date: NaiveDate,
}

impl Display for Timecode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}{}{:02} {}",
            self.hours,
            self.minutes,
            self.seconds,
            if self.drop_frame { ';' } else { ':' },
            self.frames,
            self.date.format("%Y-%m-%d"),
        )
    }
}

impl Timecode {
    /// Seconds since midnight.
    pub fn seconds_of_day(&self) -> u32 {
        self.hours as u32 * 3600 + self.minutes as u32 * 60 + self.seconds as u32
    }
}

/// SMPTE frame rates accepted for time reference derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Framerate {
    #[serde(rename = "23.976")]
    R23_976,
    #[serde(rename = "24")]
    R24,
    #[serde(rename = "25")]
    R25,
    #[serde(rename = "29.97")]
    R29_97,
    #[serde(rename = "30")]
    R30,
}

impl Framerate {
    /// The only inference LTC allows: 29.97 when the drop-frame flag is set,
    /// 30 otherwise.
    pub fn infer(drop_frame: bool) -> Self {
        if drop_frame { Self::R29_97 } else { Self::R30 }
    }

    pub fn fps(self) -> f64 {
        match self {
            Framerate::R23_976 => 24000.0 / 1001.0,
            Framerate::R24 => 24.0,
            Framerate::R25 => 25.0,
            Framerate::R29_97 => 29.97,
            Framerate::R30 => 30.0,
        }
    }

    /// Frames per timecode second.
    pub fn nominal(self) -> u8 {
        match self {
            Framerate::R23_976 | Framerate::R24 => 24,
            Framerate::R25 => 25,
            Framerate::R29_97 | Framerate::R30 => 30,
        }
    }
}

impl Display for Framerate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let fps = match &self {
            Framerate::R23_976 => "23.976",
            Framerate::R24 => "24",
            Framerate::R25 => "25",
            Framerate::R29_97 => "29.97",
            Framerate::R30 => "30",
        };

        f.write_str(fps)
    }
}

impl FromStr for Framerate {
    type Err = TimecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "23.976" | "23.98" => Ok(Self::R23_976),
            "24" => Ok(Self::R24),
            "25" => Ok(Self::R25),
            "29.97" | "29.97df" => Ok(Self::R29_97),
            "30" => Ok(Self::R30),
            other => Err(TimecodeError::UnknownFramerate(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_timecode_text() {
        let tc: RawTimecode = "01:02:03:04".parse().unwrap();
        assert_eq!((tc.hours, tc.minutes, tc.seconds, tc.frames), (1, 2, 3, 4));
        assert!(!tc.drop_frame);

        let df: RawTimecode = "10:00:00;02".parse().unwrap();
        assert!(df.drop_frame);
        assert_eq!(df.frames, 2);

        let out_of_range: RawTimecode = "25:61:00:00".parse().unwrap();
        assert_eq!(out_of_range.hours, 25);
        assert_eq!(out_of_range.minutes, 61);
    }

    #[test]
    fn reject_malformed_timecode_text() {
        for text in ["", "01:02:03", "01:02:03:04:05", "1:2:3:x", "001:02:03:04", "01:02::04"] {
            assert!(text.parse::<RawTimecode>().is_err(), "{text}");
        }
    }

    #[test]
    fn parse_date_text() {
        assert_eq!(
            "2024-05-17".parse::<RawDate>().unwrap(),
            RawDate {
                year: YearDigits::Four(2024),
                month: 5,
                day: 17
            }
        );
        assert_eq!(
            "870230".parse::<RawDate>().unwrap(),
            RawDate {
                year: YearDigits::Two(87),
                month: 2,
                day: 30
            }
        );
        assert!("2024/05/17".parse::<RawDate>().is_err());
        assert!("24-5-17".parse::<RawDate>().is_err());
    }

    #[test]
    fn framerate_inference() {
        assert_eq!(Framerate::infer(true), Framerate::R29_97);
        assert_eq!(Framerate::infer(false), Framerate::R30);
        assert_eq!("29.97".parse::<Framerate>().unwrap().nominal(), 30);
        assert!("48".parse::<Framerate>().is_err());
        assert_eq!(format!("{}", Framerate::R23_976), "23.976");
    }
}
