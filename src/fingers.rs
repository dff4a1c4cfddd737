//! Per-frame finger up/down estimation.
//!
//! Deterministic and stateless: one `FingerState` per call, no history.
//! Each non-thumb finger gets three independent checks and needs two of
//! them — a majority vote that tolerates one noisy signal per finger per
//! frame. The thumb swings sideways rather than curling toward the wrist,
//! so it gets its own distance-ratio / IP-angle pair combined with OR:
//! the two fail under different hand rotations and either alone is enough.

use crate::config::FingerThresholds;
use crate::geometry::{angle, distance};
use crate::hand::{
    FingerState, HandFrame, INDEX_MCP, THUMB_IP, THUMB_MCP, THUMB_TIP, WRIST,
};

const FINGER_TIPS: [usize; 4] = [8, 12, 16, 20];
const FINGER_PIPS: [usize; 4] = [6, 10, 14, 18];
const FINGER_MCPS: [usize; 4] = [5, 9, 13, 17];

/// Estimate which fingers are extended this frame.
pub fn estimate(frame: &HandFrame, is_back_of_hand: bool, th: &FingerThresholds) -> FingerState {
    let wrist = frame.point(WRIST);

    // Thumb: reach past the index knuckle, or a straight IP joint.
    let thumb_reach = distance(frame.point(THUMB_TIP), frame.point(INDEX_MCP));
    let thumb_base = distance(frame.point(THUMB_MCP), frame.point(INDEX_MCP));
    let thumb_ip_angle = angle(
        frame.point(THUMB_MCP),
        frame.point(THUMB_IP),
        frame.point(THUMB_TIP),
    );
    let thumb = thumb_reach > thumb_base * th.thumb_reach_ratio || thumb_ip_angle > th.thumb_ip_angle;

    let mut up = [false; 4];
    for (i, ((&tip, &pip), &mcp)) in FINGER_TIPS
        .iter()
        .zip(&FINGER_PIPS)
        .zip(&FINGER_MCPS)
        .enumerate()
    {
        let tip_p = frame.point(tip);
        let pip_p = frame.point(pip);
        let mcp_p = frame.point(mcp);

        let reach_check = distance(tip_p, wrist) > distance(pip_p, wrist) * th.tip_reach_ratio;
        let angle_check = angle(mcp_p, pip_p, tip_p) > th.pip_angle;
        // Camera-relative "up" flips between palm and back view.
        let vertical_check = if is_back_of_hand {
            tip_p.y < pip_p.y
        } else {
            tip_p.y > pip_p.y
        };

        let votes = [reach_check, angle_check, vertical_check]
            .iter()
            .filter(|&&v| v)
            .count();
        up[i] = votes >= 2;
    }

    FingerState {
        thumb,
        index: up[0],
        middle: up[1],
        ring: up[2],
        pinky: up[3],
    }
}
