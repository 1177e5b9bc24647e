//! Solo/mute audio routing.
//!
//! The mixer holds two sets of track indices and computes a binary gain
//! decision per track. Solo and mute are mutually exclusive per track:
//! toggling a track into one set evicts it from the other, so the two sets
//! never intersect.

use std::collections::HashSet;

/// Per-track audibility overrides.
///
/// Gains are applied continuously to the live instrument instances, not
/// once at toggle time: whenever the solo set, mute set, or the set of
/// loaded instruments changes, every track's gain is re-derived through
/// [`Mixer::audible_gain`].
#[derive(Debug, Clone, Default)]
pub struct Mixer {
    solo: HashSet<usize>,
    muted: HashSet<usize>,
}

impl Mixer {
    /// Creates a mixer with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles solo for a track.
    ///
    /// Soloing a muted track un-mutes it first; un-soloing simply removes
    /// the override.
    pub fn toggle_solo(&mut self, index: usize) {
        if !self.solo.remove(&index) {
            self.muted.remove(&index);
            self.solo.insert(index);
        }
    }

    /// Toggles mute for a track.
    ///
    /// Muting a soloed track un-solos it first; un-muting simply removes
    /// the override.
    pub fn toggle_mute(&mut self, index: usize) {
        if !self.muted.remove(&index) {
            self.solo.remove(&index);
            self.muted.insert(index);
        }
    }

    /// Returns true if the track is soloed.
    pub fn is_solo(&self, index: usize) -> bool {
        self.solo.contains(&index)
    }

    /// Returns true if the track is muted.
    pub fn is_muted(&self, index: usize) -> bool {
        self.muted.contains(&index)
    }

    /// Returns true if any track is soloed.
    ///
    /// Solo mode suppresses every non-soloed track regardless of its mute
    /// state, so callers branch on this before consulting mutes.
    pub fn solo_active(&self) -> bool {
        !self.solo.is_empty()
    }

    /// Computes the gain decision for a track.
    ///
    /// With a non-empty solo set, only soloed tracks are audible. With no
    /// solos, every non-muted track is audible.
    pub fn audible_gain(&self, index: usize) -> f32 {
        if self.solo_active() {
            if self.solo.contains(&index) {
                1.0
            } else {
                0.0
            }
        } else if self.muted.contains(&index) {
            0.0
        } else {
            1.0
        }
    }

    /// Returns true if a track should be scheduled at all.
    ///
    /// The synthesizer path filters tracks up front instead of modulating
    /// a live gain, because its voices are created fresh each play cycle.
    pub fn is_audible(&self, index: usize) -> bool {
        self.audible_gain(index) > 0.0
    }

    /// Removes all overrides.
    pub fn clear(&mut self) {
        self.solo.clear();
        self.muted.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_round_trip() {
        let mut mixer = Mixer::new();
        mixer.toggle_solo(2);
        assert!(mixer.is_solo(2));
        mixer.toggle_solo(2);
        assert!(!mixer.is_solo(2));

        mixer.toggle_mute(1);
        assert!(mixer.is_muted(1));
        mixer.toggle_mute(1);
        assert!(!mixer.is_muted(1));
    }

    #[test]
    fn test_solo_and_mute_are_exclusive() {
        let mut mixer = Mixer::new();
        mixer.toggle_mute(3);
        mixer.toggle_solo(3);
        assert!(mixer.is_solo(3));
        assert!(!mixer.is_muted(3));

        mixer.toggle_mute(3);
        assert!(!mixer.is_solo(3));
        assert!(mixer.is_muted(3));
    }

    #[test]
    fn test_exclusivity_after_arbitrary_sequence() {
        let mut mixer = Mixer::new();
        for &(solo, idx) in &[
            (true, 0),
            (false, 0),
            (true, 1),
            (false, 2),
            (true, 2),
            (false, 1),
            (true, 0),
        ] {
            if solo {
                mixer.toggle_solo(idx);
            } else {
                mixer.toggle_mute(idx);
            }
            for track in 0..4 {
                assert!(!(mixer.is_solo(track) && mixer.is_muted(track)));
            }
        }
    }

    #[test]
    fn test_solo_suppresses_everything_else() {
        let mut mixer = Mixer::new();
        mixer.toggle_solo(2);
        assert_eq!(mixer.audible_gain(2), 1.0);
        assert_eq!(mixer.audible_gain(0), 0.0);
        assert_eq!(mixer.audible_gain(1), 0.0);
        assert_eq!(mixer.audible_gain(3), 0.0);
    }

    #[test]
    fn test_mute_without_solo() {
        let mut mixer = Mixer::new();
        mixer.toggle_mute(1);
        mixer.toggle_mute(3);
        assert_eq!(mixer.audible_gain(0), 1.0);
        assert_eq!(mixer.audible_gain(1), 0.0);
        assert_eq!(mixer.audible_gain(2), 1.0);
        assert_eq!(mixer.audible_gain(3), 0.0);
    }

    #[test]
    fn test_no_overrides_all_audible() {
        let mixer = Mixer::new();
        for track in 0..8 {
            assert_eq!(mixer.audible_gain(track), 1.0);
        }
    }
}
