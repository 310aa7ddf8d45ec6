use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::Level;
use ltc::process::scan::ScanConfig;
use ltc::process::validate::{Validator, ValidatorConfig};
use ltc::structs::sample_buffer::SampleBuffer;

use crate::input::InputReader;
use crate::timestamp::time_str;
use crate::wav::{WavFile, read_wav};
use self::command::{Cli, SourceArgs, ValidationArgs};

pub mod check;
pub mod command;
pub mod generate;
pub mod metadata;
pub mod scan;

/// Corrections become errors under `--strict`.
pub(crate) fn fail_level(cli: &Cli) -> Level {
    if cli.strict { Level::Warn } else { Level::Error }
}

pub(crate) fn load_wav(input: &Path) -> Result<WavFile> {
    let mut reader = InputReader::new(input)?;
    if reader.is_pipe() {
        log::info!("Reading WAV data from stdin");
    }

    let wav = read_wav(&reader.read_all()?)?;
    log::info!(
        "{}: {} Hz, {} channel(s), {}, {}",
        input.display(),
        wav.format.sample_rate,
        wav.format.channels,
        wav.buffer.format(),
        time_str(wav.buffer.duration_secs())
    );

    Ok(wav)
}

pub(crate) fn scan_config(source: &SourceArgs) -> ScanConfig {
    ScanConfig {
        channel: source.channel,
        max_seconds: (source.max_seconds > 0.0).then_some(source.max_seconds),
        ..Default::default()
    }
}

/// Validator for `args` on top of `defaults`.
pub(crate) fn validator(args: &ValidationArgs, defaults: ValidatorConfig, cli: &Cli) -> Validator {
    let config = ValidatorConfig {
        century: args.century.map(Into::into).unwrap_or(defaults.century),
        preserve_raw_minute_second: args.preserve_raw || defaults.preserve_raw_minute_second,
    };

    let mut validator = Validator::new(config);
    validator.set_fail_level(fail_level(cli));
    validator
}

pub(crate) fn spinner(multi: Option<&MultiProgress>, message: &str) -> Result<Option<ProgressBar>> {
    let Some(multi) = multi else {
        return Ok(None);
    };

    let pb = multi.add(ProgressBar::new_spinner());
    pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());

    Ok(Some(pb))
}
