//! Frame-by-frame recognition session.
//!
//! Owns the filter and stabilizer state for one hand stream and runs the
//! full per-frame chain: smooth landmarks, detect orientation, estimate
//! fingers, classify, stabilize. Frames with no hand still advance the
//! stabilizer so stale letters age out.

use crate::classify;
use crate::config::Profile;
use crate::filter::LandmarkFilter;
use crate::hand::{Classification, HandFrame, Letter};
use crate::orientation;
use crate::stabilize::Stabilizer;

/// Everything the pipeline concluded about one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutput {
    /// This frame's unsmoothed cascade opinion.
    pub raw: Classification,
    /// The temporally stabilized letter, if any.
    pub stable: Classification,
    pub back_of_hand: bool,
    pub hand_steady: bool,
}

impl FrameOutput {
    fn empty() -> Self {
        Self {
            raw: Classification::none(),
            stable: Classification::none(),
            back_of_hand: false,
            hand_steady: false,
        }
    }
}

#[derive(Debug)]
pub struct Session {
    profile: Profile,
    filter: LandmarkFilter,
    stabilizer: Stabilizer,
}

impl Session {
    pub fn new(profile: Profile) -> Self {
        let filter = LandmarkFilter::new(profile.filter.clone());
        let stabilizer = Stabilizer::new(profile.stabilizer.clone());
        Self {
            profile,
            filter,
            stabilizer,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(Profile::default())
    }

    /// Process one frame; `None` means the tracker saw no hand.
    pub fn process(&mut self, frame: Option<HandFrame>) -> FrameOutput {
        let Some(frame) = frame else {
            let stable = self.stabilizer.push(Classification::none());
            return FrameOutput {
                stable,
                ..FrameOutput::empty()
            };
        };

        let smoothed = self.filter.push(frame);
        let back_of_hand = orientation::is_back_of_hand(&smoothed, &self.profile.orientation);
        let raw = classify::classify(
            &smoothed,
            back_of_hand,
            &self.profile.fingers,
            &self.profile.classifier,
        );
        let stable = self.stabilizer.push(raw);

        FrameOutput {
            raw,
            stable,
            back_of_hand,
            hand_steady: self.filter.is_steady(),
        }
    }

    pub fn reset(&mut self) {
        self.filter.reset();
        self.stabilizer.reset();
    }

    pub fn stable_letter(&self) -> Option<Letter> {
        self.stabilizer.stable_letter()
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::Letter;
    use crate::testkit::pose;

    #[test]
    fn held_sign_locks_in() {
        let mut s = Session::with_defaults();
        let mut out = FrameOutput::empty();
        for _ in 0..8 {
            out = s.process(Some(pose::two_up(0.40)));
        }
        assert_eq!(out.raw.letter, Some(Letter::V));
        assert_eq!(out.stable.letter, Some(Letter::V));
        assert!(out.stable.confidence >= out.raw.confidence);
        assert!(out.hand_steady);
        assert_eq!(s.stable_letter(), Some(Letter::V));
    }

    #[test]
    fn missing_hand_produces_empty_output() {
        let mut s = Session::with_defaults();
        let out = s.process(None);
        assert!(out.raw.is_none());
        assert!(out.stable.is_none());
        assert!(!out.hand_steady);
    }

    #[test]
    fn lost_hand_ages_the_letter_out() {
        let mut s = Session::with_defaults();
        for _ in 0..8 {
            s.process(Some(pose::letter_l()));
        }
        let mut out = FrameOutput::empty();
        for _ in 0..8 {
            out = s.process(None);
        }
        assert!(out.stable.is_none());
    }

    #[test]
    fn reset_starts_a_fresh_session() {
        let mut s = Session::with_defaults();
        for _ in 0..8 {
            s.process(Some(pose::three_up()));
        }
        assert_eq!(s.stable_letter(), Some(Letter::W));
        s.reset();
        assert_eq!(s.stable_letter(), None);
        let out = s.process(Some(pose::three_up()));
        assert!(out.stable.is_none(), "history must restart after reset");
    }

    #[test]
    fn jitter_does_not_flip_the_letter() {
        let mut s = Session::with_defaults();
        let base = pose::letter_i();
        for i in 0..10 {
            let mut frame = base.clone();
            for p in frame.points_mut() {
                p.x += (i % 3) as f32 * 0.5;
                p.y -= (i % 2) as f32 * 0.5;
            }
            let out = s.process(Some(frame));
            if let Some(l) = out.stable.letter {
                assert_eq!(l, Letter::I);
            }
        }
    }
}
