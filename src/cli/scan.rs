use anyhow::Result;
use indicatif::MultiProgress;
use ltc::process::recover::RecoveryParams;
use ltc::process::scan::{FoundFrame, Scanner, decode_at};
use ltc::process::validate::{Validator, ValidatorConfig};
use ltc::structs::timecode::Framerate;
use ltc::utils::errors::ScanError;

use super::command::{Cli, ScanArgs};
use super::{fail_level, load_wav, scan_config, spinner};
use crate::timestamp::sample_time_str;

pub fn cmd_scan(args: &ScanArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    log::info!("Scanning for LTC: {}", args.source.input.display());

    let wav = load_wav(&args.source.input)?;
    let sample_rate = wav.format.sample_rate;
    let mut validator = Validator::new(ValidatorConfig::for_decoded());
    validator.set_fail_level(fail_level(cli));

    if let Some(offset) = args.at {
        let found = decode_at(
            &wav.buffer,
            args.source.channel,
            offset,
            &RecoveryParams::anchored(),
        )?;
        display_frame(&found, &validator, sample_rate)?;
        return Ok(());
    }

    let pb = spinner(multi, "Scanning for LTC...")?;
    let mut scanner = Scanner::new(&wav.buffer, &scan_config(&args.source))?;
    let mut count = 0usize;

    while let Some(result) = scanner.next() {
        let found = match result {
            Ok(found) => found,
            Err(e @ (ScanError::NoSyncFound { .. } | ScanError::InsufficientBits { .. })) => {
                if let Some(ref pb) = pb {
                    pb.finish_and_clear();
                }
                log::debug!("{e}");
                println!("No LTC found in channel {}.", args.source.channel);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        count += 1;
        match pb {
            Some(ref pb) => pb.suspend(|| display_frame(&found, &validator, sample_rate))?,
            None => display_frame(&found, &validator, sample_rate)?,
        }

        if !args.all {
            break;
        }

        if let Some(ref pb) = pb {
            pb.set_message(format!(
                "Scanning for LTC...       {count} frames, {:.0}%",
                scanner.position() as f64 * 100.0 / scanner.trace_len().max(1) as f64
            ));
        }
    }

    if let Some(ref pb) = pb {
        pb.finish_and_clear();
    }

    if args.all {
        println!("Frames found                {count} ({} windows)", scanner.windows());
    }

    Ok(())
}

fn display_frame(found: &FoundFrame, validator: &Validator, sample_rate: u32) -> Result<()> {
    let frame = &found.frame;
    let framerate = Framerate::infer(frame.drop_frame);
    let validated = validator.validate(&frame.to_raw(), framerate)?;

    println!("LTC frame                   {frame}");
    println!(
        "  Sample offset             {} ({})",
        found.sample_offset,
        sample_time_str(found.sample_offset, sample_rate)
    );
    println!("  Sync word                 {}/16", frame.sync_matches);
    println!("  Drop frame                {}", frame.drop_frame);
    println!("  Color frame               {}", frame.color_frame);
    println!("  Flag bits                 {:04b}", frame.flag_bits);
    match frame.date_digits() {
        Some(digits) => println!("  User bits                 {digits}"),
        None => println!("  User bits                 {:X?}", frame.user_bits),
    }
    println!("  Bit period                {:.3} samples", found.samples_per_bit);
    println!("  Validated                 {}", validated.timecode);
    println!();

    Ok(())
}
