/// Sample stream to polarity trace.
///
/// Provides [`digitize`](digitize::digitize), the zero-threshold comparator
/// that feeds the bit recoverer.
pub mod digitize;

/// Biphase-mark clock and data recovery.
///
/// Provides [`recover_bits`](recover::recover_bits) and the
/// [`RecoveryParams`](recover::RecoveryParams) presets for free scanning and
/// anchored decoding.
pub mod recover;

/// Sync word search over recovered bits.
pub mod synchronize;

/// Frame search over a sample buffer.
///
/// Provides the [`Scanner`](scan::Scanner) iterator for free scans and
/// [`decode_at`](scan::decode_at) for a frame at a known offset.
pub mod scan;

/// Range checks and corrections.
///
/// Provides the [`Validator`](validate::Validator), shared by decoded frames
/// and text timecodes.
pub mod validate;

/// Time reference and origination stamps.
pub mod derive;

/// LTC waveform synthesis.
pub mod encode;
