use std::path::PathBuf;
use std::sync::LazyLock;

use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};
use ltc::structs::timecode::Framerate;
use ltc::utils::date::CenturyPolicy;

static LONG_VERSION: LazyLock<String> = LazyLock::new(|| {
    format!(
        "{} ({}, built {})\nltc {}",
        env!("CARGO_PKG_VERSION"),
        option_env!("VERGEN_GIT_DESCRIBE").unwrap_or("unknown"),
        env!("BUILD_TIMESTAMP"),
        env!("LTC_VERSION"),
    )
});

#[derive(Debug, ClapParser)]
#[command(
    name         = env!("CARGO_PKG_NAME"),
    version      = env!("CARGO_PKG_VERSION"),
    long_version = LONG_VERSION.as_str(),
    author       = env!("CARGO_PKG_AUTHORS"),
    about        = "Reads LTC timecode from audio and derives time reference metadata",
    long_about   = None,
)]
pub struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Treat warnings as fatal errors (fail on first timecode correction).
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Show a spinner while scanning.
    #[arg(long, global = true)]
    pub progress: bool,

    /// Choose an operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find and print LTC frames in a WAV file.
    Scan(ScanArgs),

    /// Derive time reference and origination stamps from a WAV file.
    Metadata(MetadataArgs),

    /// Validate a timecode given as text and derive its metadata.
    Check(CheckArgs),

    /// Write a WAV file carrying an LTC signal.
    Generate(GenerateArgs),
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Input WAV file (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Channel carrying the LTC signal (0-based).
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub channel: usize,

    /// Seconds of audio to search, 0 for the whole file.
    #[arg(long, value_name = "S", default_value_t = ltc::process::digitize::DEFAULT_MAX_SECONDS)]
    pub max_seconds: f64,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Decode a single frame starting at this sample instead of searching.
    #[arg(long, value_name = "SAMPLE")]
    pub at: Option<usize>,

    /// Print every frame found, not just the first.
    #[arg(long, conflicts_with = "at")]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct MetadataArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub validation: ValidationArgs,

    /// Frame rate of the timecode.
    #[arg(long, value_name = "FPS", default_value = "auto")]
    pub fps: FpsArg,

    /// Report the time reference of the first sample instead of the frame.
    #[arg(long)]
    pub anchor_to_start: bool,

    /// Write a YAML report to this path.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Timecode as HH:MM:SS:FF (HH:MM:SS;FF for drop-frame).
    #[arg(value_name = "TIMECODE")]
    pub timecode: String,

    /// Recording date as YYYY-MM-DD or YYMMDD.
    #[arg(long, value_name = "DATE")]
    pub date: Option<String>,

    /// Sample rate the time reference is counted in.
    #[arg(long, value_name = "HZ", default_value_t = 48000)]
    pub sample_rate: u32,

    /// Frame rate of the timecode.
    #[arg(long, value_name = "FPS", default_value = "auto")]
    pub fps: FpsArg,

    #[command(flatten)]
    pub validation: ValidationArgs,
}

#[derive(Debug, Args)]
pub struct ValidationArgs {
    /// How two-digit years are expanded (default: prefix20 for audio,
    /// pivot50 for text dates).
    #[arg(long, value_enum, value_name = "POLICY")]
    pub century: Option<CenturyArg>,

    /// Keep minutes and seconds of 60 and above instead of wrapping them.
    #[arg(long)]
    pub preserve_raw: bool,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Output WAV file.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Timecode of the first frame.
    #[arg(long, value_name = "TIMECODE", default_value = "00:00:00:00")]
    pub start: String,

    /// Recording date stored in the user bits, YYYY-MM-DD or YYMMDD.
    #[arg(long, value_name = "DATE")]
    pub date: Option<String>,

    /// Length of the signal in seconds.
    #[arg(long, value_name = "S", default_value_t = 5.0)]
    pub duration: f64,

    /// Frame rate of the signal.
    #[arg(long, value_name = "FPS", default_value = "30")]
    pub fps: FpsArg,

    #[arg(long, value_name = "HZ", default_value_t = 48000)]
    pub sample_rate: u32,

    /// Peak level of the signal, relative to full scale.
    #[arg(long, value_name = "LEVEL", default_value_t = 0.5)]
    pub amplitude: f32,

    /// Silence before the first frame, in samples.
    #[arg(long, value_name = "SAMPLES", default_value_t = 0)]
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FpsArg {
    Auto,
    Fixed(Framerate),
}

impl FpsArg {
    pub fn framerate(self) -> Option<Framerate> {
        match self {
            FpsArg::Auto => None,
            FpsArg::Fixed(framerate) => Some(framerate),
        }
    }
}

impl std::str::FromStr for FpsArg {
    type Err = ltc::utils::errors::TimecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(FpsArg::Auto);
        }
        s.parse().map(FpsArg::Fixed)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CenturyArg {
    /// Always 20YY.
    Prefix20,
    /// 00-49 as 20YY, 50-99 as 19YY.
    Pivot50,
}

impl From<CenturyArg> for CenturyPolicy {
    fn from(arg: CenturyArg) -> Self {
        match arg {
            CenturyArg::Prefix20 => CenturyPolicy::Prefix20,
            CenturyArg::Pivot50 => CenturyPolicy::Pivot50,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Disable logging output.
    Off,
    /// No output except errors.
    Error,
    /// Show warnings and errors.
    Warn,
    /// Show info, warnings and errors (default).
    Info,
    /// Show debug, info, warnings and errors.
    Debug,
    /// Show all log messages including trace.
    Trace,
}

impl LogLevel {
    /// Convert LogLevel to log::LevelFilter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text with timestamps.
    Plain,
    /// Structured JSON per log record.
    Json,
}
