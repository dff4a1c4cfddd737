//! Palm-vs-back view heuristic.
//!
//! When the hand is roughly upright, the thumb tip of a palm-facing hand
//! sits well to the side of the wrist; seen from the back it lands closer to
//! the wrist's vertical line. This breaks down at extreme wrist rotations —
//! a known limitation, which is why the finger estimator only spends one of
//! its three votes on orientation-dependent geometry.

use crate::config::OrientationThresholds;
use crate::hand::{HandFrame, INDEX_MCP, PINKY_MCP, THUMB_TIP, WRIST};

/// True when the camera most likely sees the back of the hand.
pub fn is_back_of_hand(frame: &HandFrame, th: &OrientationThresholds) -> bool {
    let wrist = frame.point(WRIST);
    let thumb_tip = frame.point(THUMB_TIP);
    let knuckle_span = (frame.point(INDEX_MCP).x - frame.point(PINKY_MCP).x).abs();

    let thumb_offset = (thumb_tip.x - wrist.x).abs();
    thumb_offset < knuckle_span * th.thumb_offset_frac
}
