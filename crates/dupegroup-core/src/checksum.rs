//! # Assignment Checksums
//!
//! A canonical byte listing of the stored grouping, and its BLAKE3 hash.
//!
//! Two runs over an unchanged corpus must produce byte-identical listings;
//! comparing checksums is the cheap way to confirm it across processes.
//!
//! Listing format, one line per grouped photo in identifier order:
//!
//! ```text
//! <identifier>\t<group id>\t<0|1>\n
//! ```

use crate::store::AssignmentMap;

/// Canonical listing of a set of assignments.
#[must_use]
pub fn canonical_listing(assignments: &AssignmentMap) -> Vec<u8> {
    let mut out = Vec::new();
    for (photo, assignment) in assignments {
        out.extend_from_slice(photo.as_str().as_bytes());
        out.push(b'\t');
        out.extend_from_slice(assignment.group_id.to_string().as_bytes());
        out.push(b'\t');
        out.push(if assignment.is_lead { b'1' } else { b'0' });
        out.push(b'\n');
    }
    out
}

/// BLAKE3 hash of the canonical listing, as lowercase hex.
///
/// # Requires
///
/// This function is only available with the `crypto-hash` feature enabled.
#[cfg(feature = "crypto-hash")]
#[must_use]
pub fn assignment_checksum(assignments: &AssignmentMap) -> String {
    blake3::hash(&canonical_listing(assignments))
        .to_hex()
        .to_string()
}
