#![allow(dead_code)]

use anyhow::Result;
use clap::Parser as ClapParser;
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;

use cli::check::cmd_check;
use cli::command::{Cli, Commands, LogFormat};
use cli::generate::cmd_generate;
use cli::metadata::cmd_metadata;
use cli::scan::cmd_scan;

mod byteorder;
mod cli;
mod input;
mod report;
pub(crate) mod timestamp;
mod wav;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let base_level = cli.loglevel.to_level_filter();

    let multi = MultiProgress::new();

    let mut env_builder = env_logger::Builder::from_default_env();
    env_builder.filter_level(base_level);
    match cli.log_format {
        LogFormat::Plain => {
            env_builder.format_timestamp_secs();
        }
        LogFormat::Json => {
            env_builder.format(|buf, record| {
                use std::io::Write;
                writeln!(
                    buf,
                    "{{\"ts\":\"{}\",\"lvl\":\"{}\",\"target\":\"{}\",\"msg\":{:?}}}",
                    buf.timestamp(),
                    record.level(),
                    record.target(),
                    record.args().to_string()
                )
            });
        }
    }

    let pb = if cli.progress {
        let logger = env_builder.build();
        LogWrapper::new(multi.clone(), logger).try_init()?;
        Some(&multi)
    } else {
        env_builder.try_init()?;
        None
    };

    match cli.command {
        Commands::Scan(ref args) => cmd_scan(args, &cli, pb)?,
        Commands::Metadata(ref args) => cmd_metadata(args, &cli, pb)?,
        Commands::Check(ref args) => cmd_check(args, &cli)?,
        Commands::Generate(ref args) => cmd_generate(args)?,
    }

    Ok(())
}
