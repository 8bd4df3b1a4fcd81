//! Recent counterpart ring with a minimum residency time.
//!
//! The ring remembers the last `RING_BUFFER_SIZE` counterparts that fed an
//! agent, each packed as `fp56 << 8 | revoked << 7 | score`. A counterpart
//! still resident in the ring is a repeat and does not move the quality
//! averages again. Revoking a resident counterpart's feedback sets its revoked
//! bit; the entry stays resident so the counterpart cannot immediately feed
//! the agent again.
//!
//! Entries of the current ring generation cannot be overwritten until the
//! generation is `MRT_MIN_RESIDENCY` seconds old. Writes arriving earlier are
//! bypassed (their fingerprint is parked in a small bypass ring) so a flood of
//! fresh identities cannot flush honest entries. After `MRT_MAX_BYPASS`
//! consecutive bypasses the next write is forced so the ring never freezes.

use serde::{Deserialize, Serialize};

use crate::params::{BYPASS_FP_SIZE, MAX_MAGNITUDE, MRT_MAX_BYPASS, MRT_MIN_RESIDENCY, RING_BUFFER_SIZE};

/// Mask selecting the 56-bit fingerprint.
pub const FP_MASK: u64 = (1 << 56) - 1;

/// Revoked bit inside the low byte of an entry. Scores never exceed 100, so
/// they fit in the remaining 7 bits.
pub const REVOKED_BIT: u64 = 1 << 7;

const SCORE_MASK: u64 = REVOKED_BIT - 1;

/// Packs a fingerprint, score and revoked bit into one ring entry.
#[inline]
pub fn encode_entry(fp56: u64, score: u8, revoked: bool) -> u64 {
    let revoked = if revoked { REVOKED_BIT } else { 0 };
    ((fp56 & FP_MASK) << 8) | revoked | u64::from(score.min(MAX_MAGNITUDE as u8))
}

/// Unpacks a ring entry into `(fp56, score, revoked)`.
#[inline]
pub fn decode_entry(entry: u64) -> (u64, u8, bool) {
    (entry >> 8, (entry & SCORE_MASK) as u8, entry & REVOKED_BIT != 0)
}

/// Takes the first 7 bytes of a fingerprint as a 56-bit value. Zero is
/// reserved for empty slots, so a zero fingerprint maps to 1.
pub fn fp56(hash: &[u8; 32]) -> u64 {
    let mut buf = [0u8; 8];
    buf[1..].copy_from_slice(&hash[..7]);
    u64::from_be_bytes(buf).max(1)
}

/// Outcome of pushing a counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Written into the ring.
    Recorded,
    /// Written after the bypass budget ran out.
    Forced,
    /// Parked in the bypass ring; the main ring is unchanged.
    Bypassed,
}

/// Fixed-size ring of recent counterparts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentCounterparts {
    pub entries: [u64; RING_BUFFER_SIZE],
    pub cursor: u8,
    /// Timestamp at which the current generation started.
    pub generation_start: u64,
    pub bypass_count: u8,
    pub bypass_fingerprints: [u64; BYPASS_FP_SIZE],
    pub bypass_cursor: u8,
}

impl RecentCounterparts {
    /// True if `fp56` is resident in the ring or the bypass ring.
    pub fn contains(&self, fp56: u64) -> bool {
        self.entries
            .iter()
            .any(|&e| e != 0 && decode_entry(e).0 == fp56)
            || self.bypass_fingerprints.iter().any(|&f| f != 0 && f == fp56)
    }

    /// Marks the resident ring entry for `fp56` revoked. Returns `false` when
    /// no unrevoked entry matches; parked bypass fingerprints carry no entry
    /// and cannot be revoked.
    pub fn revoke(&mut self, fp56: u64) -> bool {
        for entry in self.entries.iter_mut().filter(|e| **e != 0) {
            let (fp, score, revoked) = decode_entry(*entry);
            if fp == fp56 && !revoked {
                *entry = encode_entry(fp, score, true);
                return true;
            }
        }
        false
    }

    /// Number of resident entries marked revoked.
    pub fn revoked_len(&self) -> usize {
        self.entries
            .iter()
            .filter(|&&e| e != 0 && decode_entry(e).2)
            .count()
    }

    /// Number of occupied ring slots.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|&&e| e != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pushes a counterpart observed at `now`.
    pub fn push(&mut self, fp56: u64, score: u8, now: u64) -> PushOutcome {
        push_entry(
            &mut self.entries,
            &mut self.cursor,
            &mut self.generation_start,
            &mut self.bypass_count,
            &mut self.bypass_fingerprints,
            &mut self.bypass_cursor,
            fp56,
            score,
            now,
        )
    }
}

/// Core ring update over raw fields. Cursors are re-normalized on entry, so
/// arbitrary persisted values cannot index out of bounds.
#[allow(clippy::too_many_arguments)]
pub fn push_entry(
    entries: &mut [u64; RING_BUFFER_SIZE],
    cursor: &mut u8,
    generation_start: &mut u64,
    bypass_count: &mut u8,
    bypass_fingerprints: &mut [u64; BYPASS_FP_SIZE],
    bypass_cursor: &mut u8,
    fp56: u64,
    score: u8,
    now: u64,
) -> PushOutcome {
    *cursor %= RING_BUFFER_SIZE as u8;
    *bypass_cursor %= BYPASS_FP_SIZE as u8;
    *bypass_count = (*bypass_count).min(MRT_MAX_BYPASS);

    let slot = *cursor as usize;
    let occupied = entries[slot] != 0;
    let resident_long_enough = now.saturating_sub(*generation_start) >= MRT_MIN_RESIDENCY;

    let outcome = if !occupied || resident_long_enough {
        PushOutcome::Recorded
    } else if *bypass_count < MRT_MAX_BYPASS {
        bypass_fingerprints[*bypass_cursor as usize] = fp56 & FP_MASK;
        *bypass_cursor = (*bypass_cursor + 1) % BYPASS_FP_SIZE as u8;
        *bypass_count += 1;
        return PushOutcome::Bypassed;
    } else {
        PushOutcome::Forced
    };

    entries[slot] = encode_entry(fp56, score, false);
    *bypass_count = 0;
    *cursor = ((slot + 1) % RING_BUFFER_SIZE) as u8;
    if *cursor == 0 {
        *generation_start = now;
    }
    outcome
}
