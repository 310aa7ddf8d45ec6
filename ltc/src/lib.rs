//! Linear Timecode (LTC) decoding.
//!
//! ## Technical Overview
//!
//! LTC carries SMPTE timecode as an 80-bit frame per video frame, encoded
//! biphase-mark on an audio channel: every bit cell starts with a level
//! change and a "1" has a second change at mid-cell. The channel bit rate is
//! 80 times the frame rate, so about 2400 bits per second at 30 fps.
//!
//! ### Decoding pipeline
//!
//! 1. **Digitize**: one channel of PCM samples to a polarity trace
//! 2. **Recover bits**: adaptive biphase-mark decoding of the trace
//! 3. **Synchronize**: locate the 16-bit sync word, tolerating bit errors
//! 4. **Decode fields**: BCD time fields, flags and user bits
//! 5. **Validate**: range checks, corrections and the recording date
//! 6. **Derive**: time reference in samples since midnight and origination
//!    time and date
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ltc::process::derive::DerivedMetadata;
//! use ltc::process::scan::{ScanConfig, Scanner};
//! use ltc::process::validate::Validator;
//! use ltc::structs::sample_buffer::PcmBuffer;
//! use ltc::structs::timecode::Framerate;
//!
//! # let samples = vec![0.0f32; 48000];
//! let buffer = PcmBuffer::from_f32(&samples, 1, 48000)?;
//!
//! // Find the first frame
//! let found = Scanner::new(&buffer, &ScanConfig::default())?.first_frame()?;
//!
//! // Range-check it and attach a date
//! let framerate = Framerate::infer(found.frame.drop_frame);
//! let validated = Validator::default().validate(&found.frame.to_raw(), framerate)?;
//!
//! // Time reference of sample 0
//! let metadata = DerivedMetadata::derive(&validated.timecode, Some(framerate), 48000)
//!     .anchored(found.sample_offset);
//! println!("{}", metadata.time_reference);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Decoding, validation and derivation stages.
///
/// 1. **Digitizing** ([`process::digitize`]): samples to polarity trace.
///
/// 2. **Bit recovery** ([`process::recover`]): biphase-mark decoding.
///
/// 3. **Synchronization** ([`process::synchronize`], [`process::scan`]):
///    frame boundaries in a bit sequence and in a sample stream.
///
/// 4. **Validation** ([`process::validate`]) and **derivation**
///    ([`process::derive`]).
///
/// 5. **Encoding** ([`process::encode`]): reference LTC signals.
pub mod process;

/// Data structures for samples, frames and timecodes.
///
/// - **Sample buffers** ([`structs::sample_buffer`]): PCM input
/// - **Frames** ([`structs::frame`]): 80-bit layout and decoded fields
/// - **Timecodes** ([`structs::timecode`]): raw and validated timecodes, frame rates
pub mod structs;

/// Supporting infrastructure.
///
/// - **Bitstream I/O** ([`utils::bitstream_io`]): LSB-first bit reading
/// - **Dates** ([`utils::date`]): date providers and century expansion
/// - **Error Handling** ([`utils::errors`]): error types
pub mod utils;
