//!
//! # Placement Statistics
//!

// Crates.io
use derive_more::{Add, AddAssign};
use serde::{Deserialize, Serialize};

/// # Placement Counters
///
/// Accumulated per table. Overlap and misalignment counts are split by whether
/// each wire of a pair is a power wire, by position along the track (`<first>_<second>`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Add, AddAssign, Serialize, Deserialize)]
pub struct PlacementStats {
    pub signal_overlap: usize,
    pub power_overlap: usize,
    pub signal_power_overlap: usize,
    pub power_signal_overlap: usize,
    /// Different-band wires which touch, accepted unadjusted
    pub signal_not_aligned: usize,
    pub power_not_aligned: usize,
    pub mixed_not_aligned: usize,
    pub signal_multi_track: usize,
    pub power_multi_track: usize,
    /// Replicas placed in tiles other than a wire's home tile
    pub tile_replicas: usize,
    /// Wires dropped as fully covered by another
    pub absorbed: usize,
    pub merged: usize,
    pub trimmed: usize,
    pub rejected: usize,
}
impl PlacementStats {
    /// Count a same-band overlap between two wires, in track order
    pub fn incr_overlap(&mut self, first_power: bool, second_power: bool) {
        match (first_power, second_power) {
            (false, false) => self.signal_overlap += 1,
            (true, true) => self.power_overlap += 1,
            (false, true) => self.signal_power_overlap += 1,
            (true, false) => self.power_signal_overlap += 1,
        }
    }
    /// Count a touching, different-band pair
    pub fn incr_not_aligned(&mut self, first_power: bool, second_power: bool) {
        match (first_power, second_power) {
            (false, false) => self.signal_not_aligned += 1,
            (true, true) => self.power_not_aligned += 1,
            _ => self.mixed_not_aligned += 1,
        }
    }
    /// Count a wire spanning more than one track
    pub fn incr_multi_track(&mut self, power: bool) {
        if power {
            self.power_multi_track += 1;
        } else {
            self.signal_multi_track += 1;
        }
    }
    pub fn total_overlaps(&self) -> usize {
        self.signal_overlap
            + self.power_overlap
            + self.signal_power_overlap
            + self.power_signal_overlap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulate() {
        let mut a = PlacementStats::default();
        a.incr_overlap(false, true);
        a.incr_overlap(true, true);
        a.incr_multi_track(false);
        let mut b = PlacementStats::default();
        b.incr_overlap(false, true);
        b.incr_not_aligned(true, false);
        a += b;
        assert_eq!(a.signal_power_overlap, 2);
        assert_eq!(a.power_overlap, 1);
        assert_eq!(a.mixed_not_aligned, 1);
        assert_eq!(a.signal_multi_track, 1);
        assert_eq!(a.total_overlaps(), 3);
    }
}
