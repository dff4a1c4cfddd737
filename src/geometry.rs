//! Pure 2D primitives shared by the finger estimator and the classifier.

use crate::hand::Landmark;

/// Euclidean distance between two landmarks.
pub fn distance(a: Landmark, b: Landmark) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Angle at `b` formed by the rays b->a and b->c, in degrees [0, 180].
///
/// Returns 0 when either ray has zero length. The cosine is clamped to
/// [-1, 1] before `acos` so floating-point drift can't leave the domain.
pub fn angle(a: Landmark, b: Landmark, c: Landmark) -> f32 {
    let v1 = (a.x - b.x, a.y - b.y);
    let v2 = (c.x - b.x, c.y - b.y);

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();

    if mag1 * mag2 == 0.0 {
        return 0.0;
    }

    let cos = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Straightness of a joint chain: endpoint distance over the sum of
/// consecutive segment lengths. 1.0 = perfectly straight, near 0 = folded
/// back on itself. 0 when the chain is degenerate.
pub fn straightness(chain: &[Landmark]) -> f32 {
    if chain.len() < 2 {
        return 0.0;
    }
    let direct = distance(chain[0], chain[chain.len() - 1]);
    let segments: f32 = chain.windows(2).map(|w| distance(w[0], w[1])).sum();
    if segments == 0.0 {
        return 0.0;
    }
    direct / segments
}

/// Inverse of [`straightness`]: near 1 means tightly bent.
pub fn curvature(chain: &[Landmark]) -> f32 {
    let s = straightness(chain);
    if s == 0.0 && chain.len() >= 2 {
        // degenerate chain, not a bent one
        return 0.0;
    }
    1.0 - s
}

/// Normalize a distance by palm width. Falls back to the raw distance when
/// the palm width is zero (degenerate frame) rather than producing Inf.
pub fn normalize(dist: f32, palm_width: f32) -> f32 {
    if palm_width > 0.0 { dist / palm_width } else { dist }
}
