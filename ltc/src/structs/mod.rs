//! Data structures for LTC decoding.
//!
//! Contains the sample buffer abstraction the decoder reads from, the 80-bit
//! LTC frame and its decoded fields, and the timecode and frame rate types
//! shared by validation and metadata derivation.

pub mod frame;
pub mod sample_buffer;
pub mod timecode;
