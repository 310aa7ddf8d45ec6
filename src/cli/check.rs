use anyhow::{Result, ensure};
use ltc::process::derive::{DerivedMetadata, total_frames};
use ltc::process::validate::{Correction, ValidatorConfig};
use ltc::structs::timecode::{Framerate, RawDate, RawTimecode};

use super::command::{CheckArgs, Cli};
use super::validator;

pub fn cmd_check(args: &CheckArgs, cli: &Cli) -> Result<()> {
    ensure!(args.sample_rate > 0, "Sample rate must be non-zero");

    let mut raw: RawTimecode = args.timecode.parse()?;
    raw.date = args.date.as_deref().map(str::parse::<RawDate>).transpose()?;

    let framerate = args
        .fps
        .framerate()
        .unwrap_or_else(|| Framerate::infer(raw.drop_frame));

    let validator = validator(&args.validation, ValidatorConfig::for_text(), cli);
    let validated = validator.validate(&raw, framerate)?;
    let metadata = DerivedMetadata::derive(&validated.timecode, Some(framerate), args.sample_rate);

    println!("Timecode                    {}", validated.timecode);
    println!("  Frame rate                {framerate} fps");
    println!(
        "  Total frames              {:.3}",
        total_frames(&validated.timecode, framerate)
    );
    for correction in &validated.corrections {
        match correction {
            Correction::Date { raw, replacement } => {
                println!("  Corrected date            {raw} -> {replacement}")
            }
            Correction::Field {
                field,
                raw,
                corrected: Some(corrected),
                ..
            } => println!("  Corrected {field:<16}{raw} -> {corrected}"),
            Correction::Field {
                field, raw, limit, ..
            } => println!("  Out of range {field:<13}{raw} (limit {limit})"),
        }
    }
    println!();
    println!("Derived Metadata");
    println!(
        "  Time reference            {} samples at {} Hz",
        metadata.time_reference, args.sample_rate
    );
    println!("  Origination time          {}", metadata.origination_time);
    println!("  Origination date          {}", metadata.origination_date);
    println!();

    Ok(())
}
