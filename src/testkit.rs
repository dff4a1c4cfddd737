//! Synthetic hand poses for tests.
//!
//! All poses share one skeleton: wrist at (100, 300), knuckle row at y=200
//! (index 60, middle 87, ring 114, pinky 140), so the palm width is 80 and
//! normalized thresholds translate directly to pixels. Poses are drawn in
//! back-of-hand view: an extended finger points up (towards smaller y).

pub mod pose {
    use crate::hand::{HandFrame, LANDMARK_COUNT, Landmark};

    const WRIST: (f32, f32) = (100.0, 300.0);
    const THUMB_CMC: (f32, f32) = (85.0, 270.0);
    const THUMB_MCP: (f32, f32) = (75.0, 240.0);
    const MCP_X: [f32; 4] = [60.0, 87.0, 114.0, 140.0];
    const MCP_Y: f32 = 200.0;

    fn lm(p: (f32, f32)) -> Landmark {
        Landmark { x: p.0, y: p.1 }
    }

    fn finger_base(finger: usize) -> usize {
        // finger 1..=4, landmarks MCP,PIP,DIP,TIP
        1 + 4 * finger
    }

    /// Fist skeleton: four curled fingers, thumb folded against the side of
    /// the fist. Classifies as E.
    pub fn base() -> HandFrame {
        let mut pts = [Landmark::default(); LANDMARK_COUNT];
        pts[0] = lm(WRIST);
        pts[1] = lm(THUMB_CMC);
        pts[2] = lm(THUMB_MCP);
        pts[3] = lm((20.0, 225.0));
        pts[4] = lm((30.0, 230.0));
        let mut frame = HandFrame::new(pts);
        for finger in 1..=4 {
            set_curled(&mut frame, finger);
        }
        frame
    }

    /// Replace one finger (1=index..4=pinky) with a straight chain from its
    /// knuckle to `tip`.
    pub fn set_straight(frame: &mut HandFrame, finger: usize, tip: (f32, f32)) {
        let mcp = (MCP_X[finger - 1], MCP_Y);
        let (dx, dy) = (tip.0 - mcp.0, tip.1 - mcp.1);
        let base = finger_base(finger);
        let pts = frame.points_mut();
        pts[base] = lm(mcp);
        pts[base + 1] = lm((mcp.0 + 0.4 * dx, mcp.1 + 0.4 * dy));
        pts[base + 2] = lm((mcp.0 + 0.73 * dx, mcp.1 + 0.73 * dy));
        pts[base + 3] = lm(tip);
    }

    /// Fold one finger down into the fist.
    pub fn set_curled(frame: &mut HandFrame, finger: usize) {
        let x = MCP_X[finger - 1];
        set_chain(
            frame,
            finger,
            [(x, 200.0), (x, 185.0), (x + 5.0, 205.0), (x, 215.0)],
        );
    }

    /// Half-curl, as when cupping the hand: joints bowed but not folded.
    pub fn set_half_curled(frame: &mut HandFrame, finger: usize) {
        let x = MCP_X[finger - 1];
        set_chain(
            frame,
            finger,
            [
                (x, 200.0),
                (x + 20.0, 180.0),
                (x + 32.0, 192.0),
                (x + 30.0, 205.0),
            ],
        );
    }

    /// Set an explicit MCP,PIP,DIP,TIP chain for one finger.
    pub fn set_chain(frame: &mut HandFrame, finger: usize, chain: [(f32, f32); 4]) {
        let base = finger_base(finger);
        let pts = frame.points_mut();
        for (i, p) in chain.into_iter().enumerate() {
            pts[base + i] = lm(p);
        }
    }

    /// Straight thumb from its MCP out to `tip`.
    pub fn set_thumb_straight(frame: &mut HandFrame, tip: (f32, f32)) {
        let (dx, dy) = (tip.0 - THUMB_MCP.0, tip.1 - THUMB_MCP.1);
        let pts = frame.points_mut();
        pts[3] = lm((THUMB_MCP.0 + 0.5 * dx, THUMB_MCP.1 + 0.5 * dy));
        pts[4] = lm(tip);
    }

    /// Thumb folded with an explicit IP and tip.
    pub fn set_thumb(frame: &mut HandFrame, ip: (f32, f32), tip: (f32, f32)) {
        let pts = frame.points_mut();
        pts[3] = lm(ip);
        pts[4] = lm(tip);
    }

    // -- canned poses --

    /// All five digits extended. No letter uses this pattern.
    pub fn open_hand() -> HandFrame {
        let mut f = base();
        for finger in 1..=4 {
            set_straight(&mut f, finger, (MCP_X[finger - 1], 80.0));
        }
        set_thumb_straight(&mut f, (35.0, 165.0));
        f
    }

    /// Closed fist, thumb at the side: E.
    pub fn fist() -> HandFrame {
        base()
    }

    /// Fist with the thumb tip over the index knuckle: M.
    pub fn fist_m() -> HandFrame {
        let mut f = base();
        set_thumb(&mut f, (90.0, 222.0), (65.0, 225.0));
        f
    }

    /// Fist with the thumb tip over the middle knuckle: N.
    pub fn fist_n() -> HandFrame {
        let mut f = base();
        set_thumb(&mut f, (90.0, 222.0), (87.0, 228.0));
        f
    }

    /// Index and middle extended upward with the given tip separation in
    /// palm-width units. 0.40 reads as V, 0.10 as U.
    pub fn two_up(spread: f32) -> HandFrame {
        let mut f = base();
        set_straight(&mut f, 1, (60.0, 80.0));
        set_straight(&mut f, 2, (60.0 + spread * 80.0, 80.0));
        f
    }

    /// Index, middle and ring extended and spread: W.
    pub fn three_up() -> HandFrame {
        let mut f = base();
        set_straight(&mut f, 1, (60.0, 80.0));
        set_straight(&mut f, 2, (87.0, 80.0));
        set_straight(&mut f, 3, (114.0, 80.0));
        f
    }

    /// Four fingers extended and held together: B.
    pub fn four_up() -> HandFrame {
        let mut f = base();
        set_straight(&mut f, 1, (70.0, 80.0));
        set_straight(&mut f, 2, (87.0, 80.0));
        set_straight(&mut f, 3, (104.0, 80.0));
        set_straight(&mut f, 4, (119.0, 80.0));
        f
    }

    /// Fist with the thumb resting against the side of the index finger: A.
    pub fn letter_a() -> HandFrame {
        let mut f = base();
        set_thumb_straight(&mut f, (55.0, 195.0));
        f
    }

    /// Fist with the thumb poking up between index and middle: T.
    pub fn letter_t() -> HandFrame {
        let mut f = base();
        set_thumb_straight(&mut f, (75.0, 190.0));
        f
    }

    /// Fist with the thumb crossed over the middle finger's PIP: S.
    pub fn letter_s() -> HandFrame {
        let mut f = base();
        set_thumb_straight(&mut f, (85.0, 180.0));
        f
    }

    /// Thumb and curled index meeting in a ring: O.
    pub fn letter_o() -> HandFrame {
        let mut f = base();
        set_thumb_straight(&mut f, (90.0, 210.0));
        f
    }

    /// Cupped hand, all fingers half-curled, thumb open: C.
    pub fn letter_c() -> HandFrame {
        let mut f = base();
        for finger in 1..=4 {
            set_half_curled(&mut f, finger);
        }
        set_thumb_straight(&mut f, (25.0, 190.0));
        f
    }

    /// Index up, thumb touching the curled middle fingertip: D.
    pub fn letter_d() -> HandFrame {
        let mut f = base();
        set_straight(&mut f, 1, (60.0, 80.0));
        set_thumb_straight(&mut f, (80.0, 210.0));
        f
    }

    /// Index pointing sideways, thumb up: G.
    pub fn letter_g() -> HandFrame {
        let mut f = base();
        set_straight(&mut f, 1, (10.0, 290.0));
        set_thumb_straight(&mut f, (95.0, 150.0));
        f
    }

    /// Index up, thumb out sideways at a right angle: L.
    pub fn letter_l() -> HandFrame {
        let mut f = base();
        set_straight(&mut f, 1, (60.0, 80.0));
        set_thumb_straight(&mut f, (20.0, 235.0));
        f
    }

    /// Thumb pinching the curled index, other three up: F.
    pub fn letter_f() -> HandFrame {
        let mut f = base();
        set_straight(&mut f, 2, (87.0, 80.0));
        set_straight(&mut f, 3, (114.0, 80.0));
        set_straight(&mut f, 4, (140.0, 80.0));
        set_thumb_straight(&mut f, (65.0, 210.0));
        f
    }

    /// Index and middle extended sideways in parallel, slightly bowed: H.
    pub fn letter_h() -> HandFrame {
        let mut f = base();
        set_chain(
            &mut f,
            1,
            [(60.0, 200.0), (30.0, 192.0), (14.0, 200.0), (0.0, 206.0)],
        );
        set_chain(
            &mut f,
            2,
            [(87.0, 200.0), (57.0, 192.0), (41.0, 200.0), (27.0, 206.0)],
        );
        f
    }

    /// Pinky up alone: I.
    pub fn letter_i() -> HandFrame {
        let mut f = base();
        set_straight(&mut f, 4, (140.0, 80.0));
        f
    }

    /// Index and middle up in a V with the thumb against the middle
    /// knuckle: K.
    pub fn letter_k() -> HandFrame {
        let mut f = base();
        set_straight(&mut f, 1, (45.0, 85.0));
        set_straight(&mut f, 2, (100.0, 85.0));
        set_thumb_straight(&mut f, (85.0, 195.0));
        f
    }

    /// Middle finger pointing with the thumb out level: P.
    pub fn letter_p() -> HandFrame {
        let mut f = base();
        set_straight(&mut f, 2, (87.0, 80.0));
        set_thumb_straight(&mut f, (35.0, 165.0));
        f
    }

    /// Middle finger pointing with the thumb aimed down: Q.
    pub fn letter_q() -> HandFrame {
        let mut f = base();
        set_straight(&mut f, 2, (87.0, 80.0));
        set_thumb_straight(&mut f, (70.0, 270.0));
        f
    }

    /// Index and middle up and crossed at the tips: R.
    pub fn letter_r() -> HandFrame {
        let mut f = base();
        set_straight(&mut f, 1, (95.0, 85.0));
        set_straight(&mut f, 2, (80.0, 80.0));
        f
    }

    /// Index raised but hooked: X.
    pub fn letter_x() -> HandFrame {
        let mut f = base();
        set_chain(
            &mut f,
            1,
            [(60.0, 200.0), (60.0, 150.0), (65.0, 135.0), (75.0, 140.0)],
        );
        f
    }

    /// Thumb and pinky spread wide: Y.
    pub fn letter_y() -> HandFrame {
        let mut f = base();
        set_straight(&mut f, 4, (140.0, 80.0));
        set_thumb_straight(&mut f, (35.0, 165.0));
        f
    }
}
