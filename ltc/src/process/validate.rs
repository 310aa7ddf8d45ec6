use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use log::Level::Warn;
use log::info;
use serde::Serialize;

use crate::log_or_err;
use crate::structs::timecode::{Framerate, RawDate, RawTimecode, Timecode, YearDigits};
use crate::utils::date::{CenturyPolicy, DateProvider, SystemDate};
use crate::utils::errors::FieldError;

/// Validation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    pub century: CenturyPolicy,
    /// Report minutes and seconds of 60 and above but keep the raw value
    /// instead of wrapping it.
    pub preserve_raw_minute_second: bool,
}

impl ValidatorConfig {
    /// Defaults for frames decoded from audio: two-digit years are 20YY.
    pub const fn for_decoded() -> Self {
        Self {
            century: CenturyPolicy::Prefix20,
            preserve_raw_minute_second: false,
        }
    }

    /// Defaults for timecodes and dates given as text.
    pub const fn for_text() -> Self {
        Self {
            century: CenturyPolicy::Pivot50,
            preserve_raw_minute_second: false,
        }
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self::for_decoded()
    }
}

/// One anomaly found while validating a timecode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Correction {
    Date {
        raw: String,
        replacement: NaiveDate,
    },
    Field {
        field: &'static str,
        raw: u8,
        limit: u8,
        /// `None` when the raw value was kept.
        corrected: Option<u8>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    pub timecode: Timecode,
    pub corrections: Vec<Correction>,
}

/// Range-checks raw timecodes and fills in their date.
///
/// Out-of-range fields are logged at `warn` and returned as
/// [`Correction`]s. With the fail level raised to `Warn` (see
/// [`set_fail_level`](Self::set_fail_level)) the first anomaly is returned as
/// an error instead.
pub struct Validator {
    config: ValidatorConfig,
    date_provider: Box<dyn DateProvider>,
    pub fail_level: log::Level,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            config,
            date_provider: Box::new(SystemDate),
            fail_level: log::Level::Error,
        }
    }

    /// Replaces the source of the fallback date.
    pub fn with_date_provider(mut self, provider: impl DateProvider + 'static) -> Self {
        self.date_provider = Box::new(provider);
        self
    }

    /// Sets the failure level for field anomalies.
    ///
    /// - `log::Level::Error`: corrections are logged only (default)
    /// - `log::Level::Warn`: the first correction is an error (strict mode)
    pub fn set_fail_level(&mut self, level: log::Level) {
        self.fail_level = level;
    }

    /// Validates `raw` for a stream running at `framerate`.
    pub fn validate(&self, raw: &RawTimecode, framerate: Framerate) -> Result<Validated> {
        let mut corrections = Vec::new();

        let date = self.date(raw.date.as_ref(), &mut corrections)?;
        let hours = self.wrap("hour", raw.hours, 24, false, &mut corrections)?;
        let minutes = self.wrap(
            "minute",
            raw.minutes,
            60,
            self.config.preserve_raw_minute_second,
            &mut corrections,
        )?;
        let seconds = self.wrap(
            "second",
            raw.seconds,
            60,
            self.config.preserve_raw_minute_second,
            &mut corrections,
        )?;
        // no correction policy exists for frame numbers
        let frames = self.wrap("frame", raw.frames, framerate.nominal(), true, &mut corrections)?;

        Ok(Validated {
            timecode: Timecode {
                hours,
                minutes,
                seconds,
                frames,
                drop_frame: raw.drop_frame,
                color_frame: raw.color_frame,
                date,
            },
            corrections,
        })
    }

    fn wrap(
        &self,
        field: &'static str,
        value: u8,
        limit: u8,
        keep: bool,
        corrections: &mut Vec<Correction>,
    ) -> Result<u8> {
        if value < limit {
            return Ok(value);
        }

        if keep {
            log_or_err!(
                self,
                Warn,
                anyhow!(FieldError::FieldOutOfRange {
                    field,
                    value,
                    limit
                })
            );
            corrections.push(Correction::Field {
                field,
                raw: value,
                limit,
                corrected: None,
            });

            return Ok(value);
        }

        let corrected = value % limit;
        log_or_err!(
            self,
            Warn,
            anyhow!(FieldError::FieldCorrected {
                field,
                value,
                limit,
                corrected
            })
        );
        corrections.push(Correction::Field {
            field,
            raw: value,
            limit,
            corrected: Some(corrected),
        });

        Ok(corrected)
    }

    fn date(&self, raw: Option<&RawDate>, corrections: &mut Vec<Correction>) -> Result<NaiveDate> {
        let Some(raw) = raw else {
            let today = self.date_provider.today();
            info!("No recording date in timecode, using {today}");
            return Ok(today);
        };

        let year = match raw.year {
            YearDigits::Two(year) => self.config.century.expand(year),
            YearDigits::Four(year) => year as i32,
        };

        let in_range = (1..=12).contains(&raw.month) && (1..=31).contains(&raw.day);
        let date = in_range
            .then(|| NaiveDate::from_ymd_opt(year, raw.month as u32, raw.day as u32))
            .flatten();

        if let Some(date) = date {
            return Ok(date);
        }

        let replacement = self.date_provider.today();
        log_or_err!(
            self,
            Warn,
            anyhow!(FieldError::InvalidDate {
                raw: raw.to_string(),
                replacement: replacement.to_string()
            })
        );
        corrections.push(Correction::Date {
            raw: raw.to_string(),
            replacement,
        });

        Ok(replacement)
    }
}
