//! Landmark jitter filter: outlier rejection + recency-weighted smoothing.
//!
//! Upstream trackers occasionally snap a landmark set across the frame for
//! one frame. Such a frame is rejected outright (never admitted to the
//! smoothing buffer); everything else is blended with recent history so the
//! classifier sees a slightly laggy but stable hand.

use crate::config::FilterThresholds;
use crate::hand::{HandFrame, LANDMARK_COUNT, Landmark};
use log::debug;
use std::collections::VecDeque;

#[derive(Debug)]
pub struct LandmarkFilter {
    buffer: VecDeque<HandFrame>,
    movements: VecDeque<f32>,
    last_smoothed: Option<HandFrame>,
    th: FilterThresholds,
}

impl LandmarkFilter {
    pub fn new(th: FilterThresholds) -> Self {
        Self {
            buffer: VecDeque::with_capacity(th.buffer_len),
            movements: VecDeque::with_capacity(10),
            last_smoothed: None,
            th,
        }
    }

    /// Admit one raw frame and return the frame the classifier should see.
    ///
    /// Outlier frames are not admitted; the smoothed view of the existing
    /// buffer is returned instead. Before the buffer holds
    /// `min_smooth_frames` frames the raw input passes through unchanged.
    pub fn push(&mut self, frame: HandFrame) -> HandFrame {
        let admit = match self.buffer.back() {
            Some(last) => !self.is_outlier(&frame, last),
            None => true,
        };
        if admit {
            if self.buffer.len() == self.th.buffer_len {
                self.buffer.pop_front();
            }
            self.buffer.push_back(frame.clone());
        } else {
            debug!("rejected outlier landmark frame");
        }

        let out = if self.buffer.len() >= self.th.min_smooth_frames {
            self.weighted_average()
        } else {
            frame
        };

        self.track_movement(&out);
        self.last_smoothed = Some(out.clone());
        out
    }

    /// True when the last few smoothed frames barely moved. Gates letter
    /// commits and sample captures downstream; not part of classification.
    pub fn is_steady(&self) -> bool {
        if self.movements.len() < self.th.steady_window {
            return false;
        }
        self.movements
            .iter()
            .rev()
            .take(self.th.steady_window)
            .all(|&m| m < self.th.steady_frac)
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.movements.clear();
        self.last_smoothed = None;
    }

    fn is_outlier(&self, frame: &HandFrame, last: &HandFrame) -> bool {
        let hand_size = last.hand_size();
        if hand_size <= 0.0 {
            return false;
        }
        let mean = mean_displacement(frame, last);
        mean / hand_size > self.th.outlier_frac
    }

    /// Linear recency weighting: the i-th oldest buffered frame contributes
    /// weight i+1.
    fn weighted_average(&self) -> HandFrame {
        let mut acc = [(0.0f32, 0.0f32); LANDMARK_COUNT];
        let mut total_weight = 0.0f32;
        for (j, frame) in self.buffer.iter().enumerate() {
            let weight = (j + 1) as f32;
            for (slot, p) in acc.iter_mut().zip(frame.points()) {
                slot.0 += p.x * weight;
                slot.1 += p.y * weight;
            }
            total_weight += weight;
        }
        let mut points = [Landmark::default(); LANDMARK_COUNT];
        for (out, (sx, sy)) in points.iter_mut().zip(acc) {
            *out = Landmark {
                x: sx / total_weight,
                y: sy / total_weight,
            };
        }
        HandFrame::new(points)
    }

    fn track_movement(&mut self, smoothed: &HandFrame) {
        let Some(prev) = &self.last_smoothed else {
            return;
        };
        let hand_size = smoothed.hand_size();
        if hand_size <= 0.0 {
            return;
        }
        let m = mean_displacement(smoothed, prev) / hand_size;
        if self.movements.len() == 10 {
            self.movements.pop_front();
        }
        self.movements.push_back(m);
    }
}

fn mean_displacement(a: &HandFrame, b: &HandFrame) -> f32 {
    let total: f32 = a
        .points()
        .iter()
        .zip(b.points())
        .map(|(p, q)| crate::geometry::distance(*p, *q))
        .sum();
    total / LANDMARK_COUNT as f32
}
