//! Temporal letter stabilization.
//!
//! Raw per-frame guesses flicker. The stabilizer keeps a short history of
//! them, looks for consensus in a sliding window, and only surfaces a letter
//! once it dominates that window. A letter that keeps winning earns a small
//! confidence bonus, so held signs converge upward instead of oscillating.

use crate::config::StabilizerThresholds;
use crate::hand::{Classification, Letter};
use log::trace;
use std::collections::VecDeque;

#[derive(Debug)]
pub struct Stabilizer {
    history: VecDeque<Option<Letter>>,
    stable: Option<Letter>,
    stable_count: u32,
    th: StabilizerThresholds,
}

impl Stabilizer {
    pub fn new(th: StabilizerThresholds) -> Self {
        Self {
            history: VecDeque::with_capacity(th.history_len),
            stable: None,
            stable_count: 0,
            th,
        }
    }

    /// Fold one raw frame result into the history and return the stabilized
    /// view. A `None` letter still occupies a history slot so stale letters
    /// age out of the window when the hand disappears.
    pub fn push(&mut self, raw: Classification) -> Classification {
        if self.history.len() == self.th.history_len {
            self.history.pop_front();
        }
        self.history.push_back(raw.letter);

        if self.history.len() < self.th.min_history {
            return Classification::none();
        }

        let window_len = self.history.len().min(self.th.window);
        let window = self.history.iter().skip(self.history.len() - window_len);
        let Some((candidate, count)) = mode(window) else {
            return Classification::none();
        };

        if count >= self.th.full_consensus {
            if self.stable == Some(candidate) {
                self.stable_count += 1;
            } else {
                self.stable = Some(candidate);
                self.stable_count = 1;
            }

            let base = if raw.letter == Some(candidate) {
                raw.confidence
            } else {
                // consensus letter differs from this frame's guess; score
                // it from agreement alone
                self.th.emit_min
            };
            let consistency = count as f32 / window_len as f32;
            let mut conf = base
                + consistency * self.th.consistency_weight
                + (self.stable_count as f32 * self.th.stability_step).min(self.th.stability_cap);
            conf *= self.quality_multiplier(base);
            conf = conf.min(1.0);

            trace!(
                "stable {candidate}: count {count}/{window_len}, streak {}, conf {conf:.2}",
                self.stable_count
            );
            if conf >= self.th.emit_min {
                return Classification::some(candidate, conf);
            }
            return Classification::none();
        }

        if count >= self.th.partial_consensus {
            // tentative: surface it discounted, without disturbing the lock
            let base = if raw.letter == Some(candidate) {
                raw.confidence
            } else {
                self.th.emit_min
            };
            return Classification::some(candidate, base * self.th.partial_discount);
        }

        Classification::none()
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.stable = None;
        self.stable_count = 0;
    }

    pub fn stable_letter(&self) -> Option<Letter> {
        self.stable
    }

    /// Low-confidence raw guesses drag the blended score down even when the
    /// window agrees.
    fn quality_multiplier(&self, base: f32) -> f32 {
        if base < self.th.low_base {
            self.th.low_mult
        } else if base < self.th.mid_base {
            self.th.mid_mult
        } else {
            1.0
        }
    }
}

/// Most common letter in the window, with its count. `None` entries compete
/// too; a window dominated by empty frames yields no candidate. Ties go to
/// the value seen first.
fn mode<'a, I>(window: I) -> Option<(Letter, usize)>
where
    I: Iterator<Item = &'a Option<Letter>>,
{
    let mut tallies: Vec<(Option<Letter>, usize)> = Vec::new();
    for entry in window {
        match tallies.iter_mut().find(|(v, _)| v == entry) {
            Some((_, n)) => *n += 1,
            None => tallies.push((*entry, 1)),
        }
    }
    let mut best: Option<(Option<Letter>, usize)> = None;
    for (value, n) in tallies {
        if best.is_none_or(|(_, bn)| n > bn) {
            best = Some((value, n));
        }
    }
    let (value, count) = best?;
    value.map(|letter| (letter, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::Letter;

    fn stab() -> Stabilizer {
        Stabilizer::new(StabilizerThresholds::default())
    }

    #[test]
    fn silent_until_min_history() {
        let mut s = stab();
        assert!(s.push(Classification::some(Letter::V, 0.93)).is_none());
        assert!(s.push(Classification::some(Letter::V, 0.93)).is_none());
        assert!(!s.push(Classification::some(Letter::V, 0.93)).is_none());
    }

    #[test]
    fn held_letter_confidence_never_decreases() {
        let mut s = stab();
        let mut prev = 0.0f32;
        for _ in 0..12 {
            let out = s.push(Classification::some(Letter::B, 0.93));
            if let Some(l) = out.letter {
                assert_eq!(l, Letter::B);
                assert!(out.confidence >= prev, "confidence regressed");
                assert!(out.confidence <= 1.0);
                prev = out.confidence;
            }
        }
        assert!(prev > 0.93, "held letter never earned a bonus");
    }

    #[test]
    fn noise_yields_nothing() {
        let mut s = stab();
        let letters = [Letter::A, Letter::K, Letter::C, Letter::X, Letter::Y];
        for l in letters {
            let out = s.push(Classification::some(l, 0.9));
            assert!(out.is_none(), "emitted a letter from pure noise");
        }
        assert_eq!(s.stable_letter(), None);
    }

    #[test]
    fn partial_consensus_is_discounted() {
        let mut s = stab();
        s.push(Classification::some(Letter::A, 0.9));
        s.push(Classification::some(Letter::V, 0.93));
        let out = s.push(Classification::some(Letter::V, 0.93));
        assert_eq!(out.letter, Some(Letter::V));
        assert!((out.confidence - 0.93 * 0.75).abs() < 1e-4);
        // a tentative candidate does not lock
        assert_eq!(s.stable_letter(), None);
    }

    #[test]
    fn empty_frames_do_not_clear_the_lock() {
        let mut s = stab();
        for _ in 0..5 {
            s.push(Classification::some(Letter::L, 0.87));
        }
        assert_eq!(s.stable_letter(), Some(Letter::L));
        for _ in 0..3 {
            let out = s.push(Classification::none());
            assert!(out.is_none() || out.letter == Some(Letter::L));
        }
        assert_eq!(s.stable_letter(), Some(Letter::L));
    }

    #[test]
    fn letters_age_out_of_the_window() {
        let mut s = stab();
        for _ in 0..5 {
            s.push(Classification::some(Letter::L, 0.87));
        }
        // hand gone long enough that empty frames dominate the window
        let mut last = Classification::some(Letter::L, 0.87);
        for _ in 0..7 {
            last = s.push(Classification::none());
        }
        assert!(last.is_none());
    }

    #[test]
    fn switching_letters_relocks() {
        let mut s = stab();
        for _ in 0..6 {
            s.push(Classification::some(Letter::U, 0.95));
        }
        assert_eq!(s.stable_letter(), Some(Letter::U));
        let mut out = Classification::none();
        for _ in 0..8 {
            out = s.push(Classification::some(Letter::V, 0.93));
        }
        assert_eq!(out.letter, Some(Letter::V));
        assert_eq!(s.stable_letter(), Some(Letter::V));
    }

    #[test]
    fn low_quality_base_is_penalized() {
        let mut s = stab();
        let mut high = 0.0f32;
        for _ in 0..4 {
            high = s.push(Classification::some(Letter::I, 0.92)).confidence;
        }
        let mut s = stab();
        let mut low = 0.0f32;
        for _ in 0..4 {
            low = s.push(Classification::some(Letter::I, 0.66)).confidence;
        }
        assert!(low < high);
    }

    #[test]
    fn reset_forgets_everything() {
        let mut s = stab();
        for _ in 0..5 {
            s.push(Classification::some(Letter::W, 0.93));
        }
        s.reset();
        assert_eq!(s.stable_letter(), None);
        assert!(s.push(Classification::some(Letter::W, 0.93)).is_none());
    }
}
