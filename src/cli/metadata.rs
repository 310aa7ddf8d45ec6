use anyhow::{Context, Result};
use indicatif::MultiProgress;
use ltc::process::derive::DerivedMetadata;
use ltc::process::scan::Scanner;
use ltc::process::validate::ValidatorConfig;
use ltc::structs::sample_buffer::SampleBuffer;
use ltc::structs::timecode::Framerate;

use super::command::{Cli, MetadataArgs};
use super::{load_wav, scan_config, spinner, validator};
use crate::report::{Report, Source};
use crate::timestamp::sample_time_str;

pub fn cmd_metadata(args: &MetadataArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    log::info!(
        "Deriving metadata: {} (strict mode: {}, fps: {:?})",
        args.source.input.display(),
        cli.strict,
        args.fps
    );

    let wav = load_wav(&args.source.input)?;
    let sample_rate = wav.format.sample_rate;

    let pb = spinner(multi, "Scanning for LTC...")?;
    let found = Scanner::new(&wav.buffer, &scan_config(&args.source))?.first_frame();
    if let Some(ref pb) = pb {
        pb.finish_and_clear();
    }
    let found = found.with_context(|| {
        format!(
            "No usable LTC in channel {} of {}",
            args.source.channel,
            args.source.input.display()
        )
    })?;

    let framerate = args
        .fps
        .framerate()
        .unwrap_or_else(|| Framerate::infer(found.frame.drop_frame));

    let validator = validator(&args.validation, ValidatorConfig::for_decoded(), cli);
    let validated = validator.validate(&found.frame.to_raw(), framerate)?;

    let mut metadata = DerivedMetadata::derive(&validated.timecode, Some(framerate), sample_rate);
    if args.anchor_to_start {
        metadata = metadata.anchored(found.sample_offset);
    }

    println!("Timecode                    {}", validated.timecode);
    println!(
        "  Found at                  sample {} ({})",
        found.sample_offset,
        sample_time_str(found.sample_offset, sample_rate)
    );
    println!("  Frame rate                {framerate} fps");
    println!("  Corrections               {}", validated.corrections.len());
    println!();
    println!("Derived Metadata");
    println!(
        "  Time reference            {} samples{}",
        metadata.time_reference,
        if args.anchor_to_start { " (sample 0)" } else { "" }
    );
    println!("  Origination time          {}", metadata.origination_time);
    println!("  Origination date          {}", metadata.origination_date);
    println!();

    if let Some(ref path) = args.output {
        let source = Source {
            path: args.source.input.display().to_string(),
            channel: args.source.channel,
            sample_rate,
            sample_format: wav.buffer.format().to_string(),
        };
        Report::new(source, &found, &validated, metadata, args.anchor_to_start).write(path)?;
        log::info!("Report written to {}", path.display());
    }

    Ok(())
}
