use log::{debug, trace};

use crate::structs::frame::{FRAME_BITS, LtcFrame, SYNC_OFFSET, sync_matches};
use crate::utils::errors::ScanError;

/// An 80-bit window whose sync word met the threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncMatch {
    /// Index of the window's bit 0 in the searched sequence.
    pub offset: usize,
    pub frame: LtcFrame,
    pub matches: u8,
}

/// Number of 80-bit windows in a sequence of `bits` bits.
pub fn candidate_offsets(bits: usize) -> usize {
    bits.saturating_sub(FRAME_BITS - 1)
}

/// Finds the first 80-bit window in `bits` whose bits 64-79 agree with the
/// sync word in at least `threshold` of 16 positions.
///
/// Candidates are tried in order and the first one that qualifies wins; no
/// attempt is made to pick the best of several.
pub fn find_frame(bits: &[bool], threshold: u8) -> Result<SyncMatch, ScanError> {
    if bits.len() < FRAME_BITS {
        return Err(ScanError::InsufficientBits {
            found: bits.len(),
            expected: FRAME_BITS,
        });
    }

    for (offset, window) in bits.windows(FRAME_BITS).enumerate() {
        let matches = sync_matches(&window[SYNC_OFFSET..]);
        if matches < threshold {
            continue;
        }

        let Some(frame) = LtcFrame::from_bits(window) else {
            continue;
        };

        debug!("Sync word matched {matches}/16 at bit offset {offset}");
        return Ok(SyncMatch {
            offset,
            frame,
            matches,
        });
    }

    trace!("No sync word in {} bits at threshold {threshold}", bits.len());
    Err(ScanError::NoSyncFound {
        bits: bits.len(),
        offsets: candidate_offsets(bits.len()),
        windows: 1,
    })
}
