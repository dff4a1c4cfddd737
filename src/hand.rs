//! Hand landmark topology and classification result types.
//!
//! Landmarks follow the standard 21-point hand layout: wrist at 0, then four
//! joints per finger ordered MCP, PIP, DIP, TIP (the thumb uses slots 1-4
//! with its MCP at 2, IP at 3 and tip at 4).

use serde::{Deserialize, Serialize};
use std::fmt;

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// One tracked 2D keypoint in frame-pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

/// A complete 21-landmark hand observation for one frame.
///
/// Construction enforces the all-or-nothing invariant: fewer than 21 points
/// means "no hand this frame", never a partial frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    points: [Landmark; LANDMARK_COUNT],
}

impl HandFrame {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Build from a raw point list; anything but exactly 21 points is
    /// treated as no hand.
    pub fn from_points(points: &[(f32, f32)]) -> Option<Self> {
        if points.len() != LANDMARK_COUNT {
            return None;
        }
        let mut out = [Landmark::default(); LANDMARK_COUNT];
        for (slot, &(x, y)) in out.iter_mut().zip(points) {
            *slot = Landmark { x, y };
        }
        Some(Self { points: out })
    }

    pub fn point(&self, idx: usize) -> Landmark {
        self.points[idx]
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut [Landmark; LANDMARK_COUNT] {
        &mut self.points
    }

    /// Normalization unit for classifier thresholds: index-MCP to pinky-MCP.
    pub fn palm_width(&self) -> f32 {
        crate::geometry::distance(self.point(INDEX_MCP), self.point(PINKY_MCP))
    }

    /// Scale estimate for jitter thresholds: wrist to middle-MCP.
    pub fn hand_size(&self) -> f32 {
        crate::geometry::distance(self.point(WRIST), self.point(MIDDLE_MCP))
    }

    /// Joint chain MCP..TIP for one finger, for straightness checks.
    /// Finger index 0 = thumb (three joints), 1..=4 = index..pinky.
    pub fn finger_chain(&self, finger: usize) -> Vec<Landmark> {
        let joints: &[usize] = match finger {
            0 => &[THUMB_MCP, THUMB_IP, THUMB_TIP],
            1 => &[5, 6, 7, 8],
            2 => &[9, 10, 11, 12],
            3 => &[13, 14, 15, 16],
            _ => &[17, 18, 19, 20],
        };
        joints.iter().map(|&j| self.point(j)).collect()
    }
}

/// Per-frame up/down summary, order [thumb, index, middle, ring, pinky].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerState {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerState {
    pub fn pattern(&self) -> [bool; 5] {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
    }

    pub fn count_up(&self) -> usize {
        self.pattern().iter().filter(|&&b| b).count()
    }
}

impl fmt::Display for FingerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for up in self.pattern() {
            write!(f, "{}", if up { '1' } else { '0' })?;
        }
        Ok(())
    }
}

/// The 24 statically signable letters. J and Z need motion and are out of
/// scope for a per-frame classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Letter {
    A, B, C, D, E, F, G, H, I, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y,
}

pub const SUPPORTED_LETTERS: [Letter; 24] = [
    Letter::A, Letter::B, Letter::C, Letter::D, Letter::E, Letter::F,
    Letter::G, Letter::H, Letter::I, Letter::K, Letter::L, Letter::M,
    Letter::N, Letter::O, Letter::P, Letter::Q, Letter::R, Letter::S,
    Letter::T, Letter::U, Letter::V, Letter::W, Letter::X, Letter::Y,
];

impl Letter {
    pub fn as_char(self) -> char {
        match self {
            Letter::A => 'A', Letter::B => 'B', Letter::C => 'C', Letter::D => 'D',
            Letter::E => 'E', Letter::F => 'F', Letter::G => 'G', Letter::H => 'H',
            Letter::I => 'I', Letter::K => 'K', Letter::L => 'L', Letter::M => 'M',
            Letter::N => 'N', Letter::O => 'O', Letter::P => 'P', Letter::Q => 'Q',
            Letter::R => 'R', Letter::S => 'S', Letter::T => 'T', Letter::U => 'U',
            Letter::V => 'V', Letter::W => 'W', Letter::X => 'X', Letter::Y => 'Y',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        SUPPORTED_LETTERS
            .iter()
            .copied()
            .find(|l| l.as_char() == c.to_ascii_uppercase())
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One per-frame classifier opinion. `letter: None` with confidence 0 is the
/// expected "no match" outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub letter: Option<Letter>,
    pub confidence: f32,
}

impl Classification {
    pub fn none() -> Self {
        Self {
            letter: None,
            confidence: 0.0,
        }
    }

    pub fn some(letter: Letter, confidence: f32) -> Self {
        Self {
            letter: Some(letter),
            confidence,
        }
    }

    pub fn is_none(&self) -> bool {
        self.letter.is_none()
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.letter {
            Some(l) => write!(f, "{} ({:.0}%)", l, self.confidence * 100.0),
            None => write!(f, "- (0%)"),
        }
    }
}
