//! Rule-cascade letter classifier.
//!
//! Classification is a two-stage match: the finger up/down pattern selects a
//! group of candidate rules, then each rule disambiguates within the group
//! using palm-width-normalized geometry. Rules are tried in a fixed order
//! and the first hit wins, so specific shapes (a clean V, crossed R fingers)
//! must sit above the lenient catch-alls that share their pattern.
//!
//! Confidences are scores describing how cleanly a rule matched, not
//! tunables; they live in the rule bodies. Every decision threshold comes
//! from [`ClassifierThresholds`].

use crate::config::{ClassifierThresholds, FingerThresholds};
use crate::fingers;
use crate::geometry::{angle, distance, normalize, straightness};
use crate::hand::{
    Classification, HandFrame, INDEX_MCP, INDEX_PIP, INDEX_TIP, Letter, MIDDLE_MCP, MIDDLE_PIP,
    MIDDLE_TIP, PINKY_PIP, PINKY_TIP, RING_MCP, RING_PIP, RING_TIP, THUMB_MCP, THUMB_TIP, WRIST,
};
use log::trace;

/// Classify one frame. Returns no letter when the finger pattern matches no
/// rule group (an open palm, for instance, is not a letter).
pub fn classify(
    frame: &HandFrame,
    is_back_of_hand: bool,
    fingers_th: &FingerThresholds,
    th: &ClassifierThresholds,
) -> Classification {
    let state = fingers::estimate(frame, is_back_of_hand, fingers_th);
    let feats = Features::extract(frame, state.pattern());

    for rule in CASCADE {
        if rule.pattern != feats.pattern {
            continue;
        }
        if let Some(result) = (rule.apply)(&feats, th) {
            trace!("pattern {} rule {} -> {}", state, rule.name, result);
            return result;
        }
    }
    trace!("pattern {} matched no rule", state);
    Classification::none()
}

/// Palm-width-normalized measurements the rules disambiguate on. Extracted
/// once per frame; rules only read.
struct Features {
    pattern: [bool; 5],
    // tip-to-tip distances
    thumb_index: f32,
    thumb_middle: f32,
    thumb_pinky: f32,
    index_middle: f32,
    // adjacent-tip spreads
    spread_mr: f32,
    spread_rp: f32,
    // PIP-joint angles (degrees)
    index_angle: f32,
    middle_angle: f32,
    ring_angle: f32,
    pinky_angle: f32,
    // per-finger straightness
    index_straight: f32,
    middle_straight: f32,
    ring_straight: f32,
    pinky_straight: f32,
    // thumb-tip landmarks of interest
    thumb_index_mcp: f32,
    thumb_middle_mcp: f32,
    thumb_ring_mcp: f32,
    thumb_index_pip: f32,
    thumb_middle_pip: f32,
    /// Angle at the wrist between the thumb and index fingertip rays.
    ti_wrist_angle: f32,
    /// Horizontal over vertical thumb-tip offset from the index knuckle.
    l_aspect: f32,
    thumb_down: bool,
    /// Index/middle fingertips on the opposite side of each other than
    /// their knuckles.
    crossed: bool,
    /// Thumb tip horizontally between the index and middle fingertips.
    thumb_between: bool,
}

impl Features {
    fn extract(frame: &HandFrame, pattern: [bool; 5]) -> Self {
        let palm = frame.palm_width();
        let norm = |d: f32| normalize(d, palm);

        let thumb_tip = frame.point(THUMB_TIP);
        let index_tip = frame.point(INDEX_TIP);
        let middle_tip = frame.point(MIDDLE_TIP);
        let ring_tip = frame.point(RING_TIP);
        let pinky_tip = frame.point(PINKY_TIP);
        let wrist = frame.point(WRIST);
        let index_mcp = frame.point(INDEX_MCP);

        let pip_angle = |mcp, pip, tip| angle(frame.point(mcp), frame.point(pip), frame.point(tip));

        let tip_min = index_tip.x.min(middle_tip.x);
        let tip_max = index_tip.x.max(middle_tip.x);

        Self {
            pattern,
            thumb_index: norm(distance(thumb_tip, index_tip)),
            thumb_middle: norm(distance(thumb_tip, middle_tip)),
            thumb_pinky: norm(distance(thumb_tip, pinky_tip)),
            index_middle: norm(distance(index_tip, middle_tip)),
            spread_mr: norm(distance(middle_tip, ring_tip)),
            spread_rp: norm(distance(ring_tip, pinky_tip)),
            index_angle: pip_angle(INDEX_MCP, INDEX_PIP, INDEX_TIP),
            middle_angle: pip_angle(MIDDLE_MCP, MIDDLE_PIP, MIDDLE_TIP),
            ring_angle: pip_angle(RING_MCP, RING_PIP, RING_TIP),
            pinky_angle: pip_angle(crate::hand::PINKY_MCP, PINKY_PIP, PINKY_TIP),
            index_straight: straightness(&frame.finger_chain(1)),
            middle_straight: straightness(&frame.finger_chain(2)),
            ring_straight: straightness(&frame.finger_chain(3)),
            pinky_straight: straightness(&frame.finger_chain(4)),
            thumb_index_mcp: norm(distance(thumb_tip, index_mcp)),
            thumb_middle_mcp: norm(distance(thumb_tip, frame.point(MIDDLE_MCP))),
            thumb_ring_mcp: norm(distance(thumb_tip, frame.point(RING_MCP))),
            thumb_index_pip: norm(distance(thumb_tip, frame.point(INDEX_PIP))),
            thumb_middle_pip: norm(distance(thumb_tip, frame.point(MIDDLE_PIP))),
            ti_wrist_angle: angle(thumb_tip, wrist, index_tip),
            l_aspect: (thumb_tip.x - index_mcp.x).abs()
                / ((thumb_tip.y - index_mcp.y).abs() + f32::EPSILON),
            thumb_down: thumb_tip.y > frame.point(THUMB_MCP).y,
            crossed: (index_tip.x - middle_tip.x).signum()
                != (index_mcp.x - frame.point(MIDDLE_MCP).x).signum(),
            thumb_between: thumb_tip.x >= tip_min && thumb_tip.x <= tip_max,
        }
    }
}

struct Rule {
    pattern: [bool; 5],
    name: &'static str,
    apply: fn(&Features, &ClassifierThresholds) -> Option<Classification>,
}

const UP: bool = true;
const DN: bool = false;

/// First match wins. Within a shared pattern the order is load-bearing:
/// crossed fingers must outrank V, the V/U pair must outrank H, and the
/// lenient V catch-all comes dead last.
static CASCADE: &[Rule] = &[
    Rule { pattern: [DN, UP, UP, UP, DN], name: "w", apply: rule_w },
    Rule { pattern: [DN, UP, UP, DN, DN], name: "r", apply: rule_r },
    Rule { pattern: [DN, UP, UP, DN, DN], name: "v", apply: rule_v },
    Rule { pattern: [DN, UP, UP, DN, DN], name: "u", apply: rule_u },
    Rule { pattern: [UP, DN, DN, DN, DN], name: "fist", apply: rule_fist },
    Rule { pattern: [DN, UP, UP, UP, UP], name: "b", apply: rule_b },
    Rule { pattern: [UP, UP, DN, DN, DN], name: "dgl", apply: rule_dgl },
    Rule { pattern: [DN, DN, DN, DN, DN], name: "mne", apply: rule_mne },
    Rule { pattern: [UP, DN, UP, UP, UP], name: "f", apply: rule_f },
    Rule { pattern: [DN, UP, UP, DN, DN], name: "h", apply: rule_h },
    Rule { pattern: [DN, DN, DN, DN, UP], name: "i", apply: rule_i },
    Rule { pattern: [UP, UP, UP, DN, DN], name: "k", apply: rule_k },
    Rule { pattern: [UP, DN, UP, DN, DN], name: "pq", apply: rule_pq },
    Rule { pattern: [DN, UP, DN, DN, DN], name: "x", apply: rule_x },
    Rule { pattern: [UP, DN, DN, DN, UP], name: "y", apply: rule_y },
    Rule { pattern: [DN, UP, UP, DN, DN], name: "v-loose", apply: rule_v_loose },
];

fn rule_w(f: &Features, th: &ClassifierThresholds) -> Option<Classification> {
    let straight = f.index_straight > th.w_straightness
        && f.middle_straight > th.w_straightness
        && f.ring_straight > th.w_straightness
        && f.index_angle > th.uw_angle
        && f.middle_angle > th.uw_angle
        && f.ring_angle > th.uw_angle;
    let spread_im = f.index_middle > th.w_spread;
    let spread_mr = f.spread_mr > th.w_spread;

    let c = if straight && spread_im && spread_mr {
        Classification::some(Letter::W, 0.93)
    } else if straight && (spread_im || spread_mr) {
        Classification::some(Letter::W, 0.85)
    } else {
        Classification::some(Letter::W, 0.72)
    };
    Some(c)
}

fn rule_r(f: &Features, th: &ClassifierThresholds) -> Option<Classification> {
    if !f.crossed {
        return None;
    }
    let conf = if f.index_middle < th.r_tip_gap { 0.85 } else { 0.75 };
    Some(Classification::some(Letter::R, conf))
}

fn rule_v(f: &Features, th: &ClassifierThresholds) -> Option<Classification> {
    let both_straight = f.index_straight > th.vu_straightness
        && f.middle_straight > th.vu_straightness
        && f.index_angle > th.v_angle
        && f.middle_angle > th.v_angle;
    if both_straight && f.index_middle > th.v_spread {
        return Some(Classification::some(Letter::V, 0.93));
    }
    if both_straight && f.index_middle > th.v_min_spread {
        return Some(Classification::some(Letter::V, 0.85));
    }
    None
}

fn rule_u(f: &Features, th: &ClassifierThresholds) -> Option<Classification> {
    if f.index_middle >= th.u_spread {
        return None;
    }
    let both_straight = f.index_straight > th.vu_straightness
        && f.middle_straight > th.vu_straightness
        && f.index_angle > th.uw_angle
        && f.middle_angle > th.uw_angle;
    let conf = if both_straight { 0.95 } else { 0.82 };
    Some(Classification::some(Letter::U, conf))
}

/// Thumb-up fist: T, A, O, S and C all share the pattern and are separated
/// by where the thumb tip ended up.
fn rule_fist(f: &Features, th: &ClassifierThresholds) -> Option<Classification> {
    // thumb wedged between index and middle
    if f.thumb_between && f.thumb_index_pip < th.t_thumb_index_pip {
        return Some(Classification::some(Letter::T, 0.88));
    }
    // thumb resting against the index
    if f.thumb_index < th.a_thumb_index {
        let all_curled = f.index_straight < th.a_curl
            && f.middle_straight < th.a_curl
            && f.ring_straight < th.a_curl
            && f.pinky_straight < th.a_curl;
        let conf = if all_curled { 0.95 } else { 0.85 };
        return Some(Classification::some(Letter::A, conf));
    }
    // thumb and index tips meeting in a ring
    if f.thumb_index >= th.o_thumb_index_min && f.thumb_index < th.o_thumb_index_max {
        let conf = if f.index_straight < th.o_curl { 0.95 } else { 0.82 };
        return Some(Classification::some(Letter::O, conf));
    }
    // thumb crossed over the fist front
    if f.thumb_middle_pip < th.s_thumb_middle_pip {
        return Some(Classification::some(Letter::S, 0.90));
    }
    // open curve
    let cupped = f.index_straight > th.c_curl_min
        && f.index_straight < th.c_curl_max
        && f.middle_straight > th.c_curl_min
        && f.middle_straight < th.c_curl_max;
    let conf = if cupped { 0.90 } else { 0.80 };
    Some(Classification::some(Letter::C, conf))
}

fn rule_b(f: &Features, th: &ClassifierThresholds) -> Option<Classification> {
    let straight = f.index_straight > th.b_straightness
        && f.middle_straight > th.b_straightness
        && f.ring_straight > th.b_straightness
        && f.pinky_straight > th.b_straightness;
    let together = f.index_middle < th.b_spread
        && f.spread_mr < th.b_spread
        && f.spread_rp < th.b_spread;

    let conf = if straight && together {
        0.93
    } else if straight {
        0.83
    } else {
        0.70
    };
    Some(Classification::some(Letter::B, conf))
}

/// Thumb+index patterns: pointing (D), the sideways gun (G), the right
/// angle (L). D is checked first because its thumb-on-middle contact is the
/// most specific signal.
fn rule_dgl(f: &Features, th: &ClassifierThresholds) -> Option<Classification> {
    if f.thumb_middle < th.d_thumb_middle && f.index_angle > th.d_index_angle {
        return Some(Classification::some(Letter::D, 0.85));
    }
    if f.thumb_middle < th.d_thumb_middle_loose {
        return Some(Classification::some(Letter::D, 0.78));
    }
    if f.ti_wrist_angle > th.g_angle_min
        && f.ti_wrist_angle < th.g_angle_max
        && f.thumb_index > th.g_thumb_index
    {
        return Some(Classification::some(Letter::G, 0.82));
    }
    if f.ti_wrist_angle > th.g_angle_min_loose
        && f.ti_wrist_angle < th.g_angle_max_loose
        && f.thumb_index > th.g_thumb_index_loose
    {
        return Some(Classification::some(Letter::G, 0.72));
    }
    if f.l_aspect > th.l_aspect && f.index_angle > th.l_index_angle {
        return Some(Classification::some(Letter::L, 0.87));
    }
    if f.l_aspect > th.l_aspect_loose && f.index_angle > th.l_index_angle_loose {
        return Some(Classification::some(Letter::L, 0.78));
    }
    Some(Classification::some(Letter::D, 0.65))
}

/// Closed fist with the thumb wrapped in front: which knuckle the thumb tip
/// sits on separates M and N; a thumb at the side of the fist is E.
fn rule_mne(f: &Features, th: &ClassifierThresholds) -> Option<Classification> {
    let knuckles = [
        (f.thumb_index_mcp, Letter::M, 0.78),
        (f.thumb_middle_mcp, Letter::N, 0.76),
        (f.thumb_ring_mcp, Letter::M, 0.72),
    ];
    let (min_dist, letter, conf) = knuckles
        .into_iter()
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .unwrap_or((f32::MAX, Letter::E, 0.75));
    if min_dist < th.mn_knuckle {
        return Some(Classification::some(letter, conf));
    }
    let conf = if f.thumb_index < th.e_thumb_index { 0.88 } else { 0.75 };
    Some(Classification::some(Letter::E, conf))
}

fn rule_f(f: &Features, th: &ClassifierThresholds) -> Option<Classification> {
    let conf = if f.thumb_index < th.f_thumb_index && f.middle_angle > th.f_middle_angle {
        0.87
    } else if f.thumb_index < th.f_thumb_index_loose {
        0.80
    } else {
        0.65
    };
    Some(Classification::some(Letter::F, conf))
}

/// Two parallel fingers that were neither a V nor a U: sideways H. Only
/// reachable below the catch-alls' spread floor, after V and U pass.
fn rule_h(f: &Features, th: &ClassifierThresholds) -> Option<Classification> {
    if f.index_middle >= th.h_tip_gap {
        return None;
    }
    let parallel = (f.index_angle - f.middle_angle).abs() < th.h_angle_diff;
    let conf = if parallel { 0.85 } else { 0.75 };
    Some(Classification::some(Letter::H, conf))
}

fn rule_i(f: &Features, th: &ClassifierThresholds) -> Option<Classification> {
    let conf = if f.pinky_angle > th.i_pinky_angle { 0.92 } else { 0.75 };
    Some(Classification::some(Letter::I, conf))
}

fn rule_k(f: &Features, th: &ClassifierThresholds) -> Option<Classification> {
    let straight =
        f.index_straight > th.k_straightness && f.middle_straight > th.k_straightness;
    let spread = f.index_middle > th.k_spread;
    let thumb_at_middle = f.thumb_middle_mcp < th.k_thumb_middle_mcp;

    let conf = if straight && spread && thumb_at_middle {
        0.92
    } else if straight && spread {
        0.85
    } else if straight {
        0.75
    } else {
        0.65
    };
    Some(Classification::some(Letter::K, conf))
}

fn rule_pq(f: &Features, th: &ClassifierThresholds) -> Option<Classification> {
    if f.thumb_down {
        let conf = if f.middle_angle > th.pq_middle_angle { 0.78 } else { 0.70 };
        return Some(Classification::some(Letter::Q, conf));
    }
    if f.index_angle < th.p_index_angle && f.middle_angle > th.pq_middle_angle {
        return Some(Classification::some(Letter::P, 0.82));
    }
    let conf = if f.middle_angle > th.p_middle_angle_loose { 0.72 } else { 0.65 };
    Some(Classification::some(Letter::P, conf))
}

fn rule_x(f: &Features, th: &ClassifierThresholds) -> Option<Classification> {
    let conf = if f.index_angle < th.x_index_angle {
        0.82
    } else if f.index_angle < th.x_index_angle_loose {
        0.73
    } else {
        0.65
    };
    Some(Classification::some(Letter::X, conf))
}

fn rule_y(f: &Features, th: &ClassifierThresholds) -> Option<Classification> {
    let conf = if f.thumb_pinky > th.y_thumb_pinky {
        0.92
    } else if f.thumb_pinky > th.y_thumb_pinky_loose {
        0.83
    } else {
        0.75
    };
    Some(Classification::some(Letter::Y, conf))
}

/// Widely spread index/middle that failed every specific rule: still more
/// likely a sloppy V than nothing.
fn rule_v_loose(f: &Features, th: &ClassifierThresholds) -> Option<Classification> {
    if f.index_middle > th.v_spread {
        return Some(Classification::some(Letter::V, 0.72));
    }
    None
}
