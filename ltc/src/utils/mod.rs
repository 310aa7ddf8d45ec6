//! Supporting infrastructure.
//!
//! Provides bit-level reading of packed frames, calendar helpers for the
//! user-bit recording date, and error handling.

pub mod bitstream_io;
pub mod date;
pub mod errors;
