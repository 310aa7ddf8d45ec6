use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ltc::process::derive::DerivedMetadata;
use ltc::process::scan::FoundFrame;
use ltc::process::validate::{Correction, Validated};
use serde::Serialize;

/// YAML report written by `ltcstamp metadata --output`.
#[derive(Debug, Serialize)]
pub struct Report {
    pub version: String,
    pub creation_tool: String,
    pub creation_tool_version: String,
    pub source: Source,
    pub timecode: TimecodeInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub corrections: Vec<Correction>,
    pub metadata: DerivedMetadata,
}

#[derive(Debug, Serialize)]
pub struct Source {
    pub path: String,
    pub channel: usize,
    pub sample_rate: u32,
    pub sample_format: String,
}

#[derive(Debug, Serialize)]
pub struct TimecodeInfo {
    /// As decoded, before validation.
    pub decoded: String,
    pub validated: String,
    pub drop_frame: bool,
    pub color_frame: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_bits: Option<String>,
    pub sync_matches: u8,
    pub sample_offset: usize,
    /// Whether `metadata.time_reference` refers to sample 0 rather than to
    /// the frame.
    pub anchored_to_start: bool,
}

pub const REPORT_VERSION: &str = "1.0";

impl Report {
    pub fn new(
        source: Source,
        found: &FoundFrame,
        validated: &Validated,
        metadata: DerivedMetadata,
        anchored_to_start: bool,
    ) -> Self {
        Self {
            version: REPORT_VERSION.to_string(),
            creation_tool: env!("CARGO_PKG_NAME").to_string(),
            creation_tool_version: env!("CARGO_PKG_VERSION").to_string(),
            source,
            timecode: TimecodeInfo {
                decoded: found.frame.to_string(),
                validated: validated.timecode.to_string(),
                drop_frame: found.frame.drop_frame,
                color_frame: found.frame.color_frame,
                user_bits: found.frame.date_digits(),
                sync_matches: found.frame.sync_matches,
                sample_offset: found.sample_offset,
                anchored_to_start,
            },
            corrections: validated.corrections.clone(),
            metadata,
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_yaml()?)
            .with_context(|| format!("Cannot write report to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ltc::structs::frame::{DecodedFrame, LtcFrame};
    use ltc::structs::timecode::{Framerate, Timecode};

    #[test]
    fn yaml_layout() -> Result<()> {
        let frame = DecodedFrame::new(25, 2, 3, 4);
        let found = FoundFrame {
            bits: LtcFrame::encode(&frame),
            frame,
            sample_offset: 960,
            samples_per_bit: 20.0,
        };
        let date = NaiveDate::from_ymd_opt(2024, 5, 17).expect("valid date");
        let validated = Validated {
            timecode: Timecode {
                hours: 1,
                minutes: 2,
                seconds: 3,
                frames: 4,
                drop_frame: false,
                color_frame: false,
                date,
            },
            corrections: vec![Correction::Field {
                field: "hour",
                raw: 25,
                limit: 24,
                corrected: Some(1),
            }],
        };
        let metadata = DerivedMetadata::derive(&validated.timecode, Some(Framerate::R25), 48000);

        let source = Source {
            path: "take1.wav".to_string(),
            channel: 0,
            sample_rate: 48000,
            sample_format: "16-bit signed".to_string(),
        };
        let yaml = Report::new(source, &found, &validated, metadata, false).to_yaml()?;

        let value: serde_yaml_ng::Value = serde_yaml_ng::from_str(&yaml)?;
        assert_eq!(value["timecode"]["decoded"].as_str(), Some("25:02:03:04"));
        assert_eq!(value["corrections"][0]["kind"].as_str(), Some("field"));
        assert_eq!(value["corrections"][0]["corrected"].as_u64(), Some(1));
        assert_eq!(value["metadata"]["framerate"].as_str(), Some("25"));
        assert_eq!(value["metadata"]["origination_date"].as_str(), Some("2024-05-17"));
        assert_eq!(
            value["metadata"]["time_reference"].as_u64(),
            Some(3723 * 48000 + 4 * 1920)
        );
        Ok(())
    }
}
