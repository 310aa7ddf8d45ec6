#[macro_export]
macro_rules! log_or_err {
    ($state:expr, $level:expr, $err:expr $(,)?) => {{
        if $level <= $state.fail_level {
            return Err($err);
        } else {
            match $level {
                ::log::Level::Error => ::log::error!("{}", $err),
                ::log::Level::Warn => ::log::warn!("{}", $err),
                ::log::Level::Info => ::log::info!("{}", $err),
                ::log::Level::Debug => ::log::debug!("{}", $err),
                ::log::Level::Trace => ::log::trace!("{}", $err),
            }
        }
    }};
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Unsupported sample encoding: {bits}-bit {kind}")]
    UnsupportedEncoding { bits: u16, kind: &'static str },

    #[error("Channel {channel} out of range for {channels}-channel stream")]
    ChannelOutOfRange { channel: usize, channels: usize },

    #[error("Stream must have at least one channel")]
    NoChannels,

    #[error("Sample rate must be non-zero")]
    ZeroSampleRate,

    #[error("Sample data length {len} is not a multiple of the frame size {frame_size}")]
    TruncatedSampleData { len: usize, frame_size: usize },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error(
        "No LTC sync word found in {bits} recovered bits ({offsets} candidate offsets over {windows} window(s))"
    )]
    NoSyncFound {
        bits: usize,
        offsets: usize,
        windows: usize,
    },

    #[error("Bit recovery stopped early: {found} bits recovered, {expected} required")]
    InsufficientBits { found: usize, expected: usize },

    #[error("Start offset {offset} is beyond the end of the stream ({frames} sample frames)")]
    OffsetOutOfRange { offset: usize, frames: usize },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("{field} value {value} is out of range (must be below {limit}), corrected to {corrected}")]
    FieldCorrected {
        field: &'static str,
        value: u8,
        limit: u8,
        corrected: u8,
    },

    #[error("{field} value {value} is out of range (must be below {limit}), kept as is")]
    FieldOutOfRange {
        field: &'static str,
        value: u8,
        limit: u8,
    },

    #[error("Invalid date {raw} in timecode, replaced with {replacement}")]
    InvalidDate { raw: String, replacement: String },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TimecodeError {
    #[error("Invalid timecode text {0:?}, expected HH:MM:SS:FF or HH:MM:SS;FF")]
    InvalidTimecodeText(String),

    #[error("Invalid date text {0:?}, expected YYYY-MM-DD or YYMMDD")]
    InvalidDateText(String),

    #[error("Unknown frame rate {0:?}")]
    UnknownFramerate(String),
}
