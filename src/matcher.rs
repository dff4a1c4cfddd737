//! Template matcher trained from captured samples.
//!
//! A second, data-driven opinion next to the rule cascade: labelled landmark
//! samples are collapsed into one centroid per letter in a normalized
//! feature space, and prediction scores a frame against every centroid. The
//! blend weighs finger-pattern agreement, raised-finger count and raw
//! geometric similarity. `cross_check` then arbitrates between the two
//! classifiers for letter pairs they are known to confuse.

use crate::config::FingerThresholds;
use crate::fingers;
use crate::hand::{Classification, HandFrame, LANDMARK_COUNT, Letter, WRIST};
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const MIN_SAMPLES: usize = 10;
pub const MIN_LABELS: usize = 2;

/// One labelled landmark capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub letter: Letter,
    pub points: Vec<[f32; 2]>,
}

/// Persistent pool of training samples, stored as JSON.
#[derive(Debug, Default)]
pub struct SampleStore {
    samples: Vec<Sample>,
}

impl SampleStore {
    /// Load samples from disk. A missing file is an empty store, not an
    /// error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let txt = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let samples: Vec<Sample> = serde_json::from_str(&txt)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        debug!("loaded {} samples from {}", samples.len(), path.display());
        Ok(Self { samples })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let txt = serde_json::to_string(&self.samples)?;
        fs::write(path, txt).with_context(|| format!("failed to write {}", path.display()))?;
        info!("saved {} samples to {}", self.samples.len(), path.display());
        Ok(())
    }

    pub fn add(&mut self, frame: &HandFrame, letter: Letter) {
        let points = frame.points().iter().map(|p| [p.x, p.y]).collect();
        self.samples.push(Sample { letter, points });
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("need at least {need} samples, have {have}")]
    NotEnoughSamples { have: usize, need: usize },
    #[error("need at least {need} distinct letters, have {have}")]
    NotEnoughLabels { have: usize, need: usize },
    #[error("sample for {letter} does not have {LANDMARK_COUNT} landmarks")]
    MalformedSample { letter: Letter },
}

#[derive(Debug, Clone)]
struct Centroid {
    letter: Letter,
    features: Vec<f32>,
    pattern: [bool; 5],
    finger_count: usize,
}

/// Trained per-letter centroids.
#[derive(Debug, Clone)]
pub struct Model {
    centroids: Vec<Centroid>,
}

/// Wrist-relative, hand-size-scaled coordinates: 42 values per frame.
/// Position- and scale-invariant, rotation stays meaningful.
pub fn feature_vector(frame: &HandFrame) -> Vec<f32> {
    let wrist = frame.point(WRIST);
    let scale = {
        let s = frame.hand_size();
        if s > 0.0 { s } else { 1.0 }
    };
    let mut out = Vec::with_capacity(LANDMARK_COUNT * 2);
    for p in frame.points() {
        out.push((p.x - wrist.x) / scale);
        out.push((p.y - wrist.y) / scale);
    }
    out
}

/// Collapse the sample pool into per-letter centroids.
pub fn train(store: &SampleStore, th: &FingerThresholds) -> Result<Model, TrainError> {
    if store.len() < MIN_SAMPLES {
        return Err(TrainError::NotEnoughSamples {
            have: store.len(),
            need: MIN_SAMPLES,
        });
    }

    let mut groups: Vec<(Letter, Vec<&Sample>)> = Vec::new();
    for sample in store.samples() {
        match groups.iter_mut().find(|(l, _)| *l == sample.letter) {
            Some((_, v)) => v.push(sample),
            None => groups.push((sample.letter, vec![sample])),
        }
    }
    if groups.len() < MIN_LABELS {
        return Err(TrainError::NotEnoughLabels {
            have: groups.len(),
            need: MIN_LABELS,
        });
    }

    let mut centroids = Vec::with_capacity(groups.len());
    for (letter, samples) in groups {
        let mut sum = vec![0.0f32; LANDMARK_COUNT * 2];
        let mut up_votes = [0usize; 5];
        for sample in &samples {
            let pts: Vec<(f32, f32)> = sample.points.iter().map(|p| (p[0], p[1])).collect();
            let frame = HandFrame::from_points(&pts)
                .ok_or(TrainError::MalformedSample { letter })?;
            for (acc, v) in sum.iter_mut().zip(feature_vector(&frame)) {
                *acc += v;
            }
            // orientation is unknown for stored samples; palm view is the
            // capture convention
            let state = fingers::estimate(&frame, false, th);
            for (vote, up) in up_votes.iter_mut().zip(state.pattern()) {
                if up {
                    *vote += 1;
                }
            }
        }
        let n = samples.len() as f32;
        for v in &mut sum {
            *v /= n;
        }
        let mut pattern = [false; 5];
        for (slot, votes) in pattern.iter_mut().zip(up_votes) {
            *slot = votes * 2 >= samples.len();
        }
        let finger_count = pattern.iter().filter(|&&b| b).count();
        centroids.push(Centroid {
            letter,
            features: sum,
            pattern,
            finger_count,
        });
    }
    info!("trained {} letter centroids", centroids.len());
    Ok(Model { centroids })
}

impl Model {
    pub fn letters(&self) -> impl Iterator<Item = Letter> + '_ {
        self.centroids.iter().map(|c| c.letter)
    }

    /// Score the frame against every centroid and return the best letter.
    /// Blend: 0.4 finger-pattern agreement, 0.2 finger count, 0.4 geometric
    /// similarity.
    pub fn predict(
        &self,
        frame: &HandFrame,
        is_back_of_hand: bool,
        th: &FingerThresholds,
    ) -> Classification {
        let state = fingers::estimate(frame, is_back_of_hand, th);
        let pattern = state.pattern();
        let count = state.count_up();
        let feats = feature_vector(frame);

        let mut best = Classification::none();
        for c in &self.centroids {
            let agree = pattern
                .iter()
                .zip(&c.pattern)
                .filter(|(a, b)| a == b)
                .count();
            let finger_score = agree as f32 / 5.0;
            let count_score = if count == c.finger_count { 1.0 } else { 0.0 };
            let geo_score = similarity(&feats, &c.features);
            let score = 0.4 * finger_score + 0.2 * count_score + 0.4 * geo_score;
            if score > best.confidence {
                best = Classification::some(c.letter, score);
            }
        }
        best
    }
}

/// Mean per-dimension closeness in [0, 1].
fn similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let total: f32 = a
        .iter()
        .zip(b)
        .map(|(x, y)| {
            let denom = x.abs().max(y.abs()).max(f32::EPSILON);
            1.0 - ((x - y).abs() / denom).min(1.0)
        })
        .sum();
    total / a.len() as f32
}

/// Letter groups the rule cascade and the matcher routinely disagree on.
const CONFUSABLE: &[&[Letter]] = &[
    &[Letter::V, Letter::U],
    &[Letter::M, Letter::N],
    &[Letter::P, Letter::Q],
    &[Letter::A, Letter::S, Letter::T],
    &[Letter::O, Letter::C],
];

/// Arbitrate between the rule cascade and the template matcher. Within a
/// confusable group the geometric rules are the better judge, so their
/// answer stands unless the matcher is strictly more confident.
pub fn cross_check(rule: Classification, statistical: Classification) -> Classification {
    let (Some(r), Some(s)) = (rule.letter, statistical.letter) else {
        return if rule.is_none() { statistical } else { rule };
    };
    if r == s {
        // agreement: keep the higher score
        return if statistical.confidence > rule.confidence {
            statistical
        } else {
            rule
        };
    }
    let same_group = CONFUSABLE
        .iter()
        .any(|g| g.contains(&r) && g.contains(&s));
    if same_group && rule.confidence >= statistical.confidence {
        return rule;
    }
    if statistical.confidence > rule.confidence {
        statistical
    } else {
        rule
    }
}
