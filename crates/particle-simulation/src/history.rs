//! Rolling frame timings and FPS counters

use crate::params::{FPS_WINDOW, HISTORY_LEN};
use std::collections::VecDeque;
use std::time::Instant;

/// The last [`HISTORY_LEN`] step timings of one engine, in milliseconds
#[derive(Debug, Clone, Default)]
pub struct PerformanceHistory {
    samples: VecDeque<f32>,
}

impl PerformanceHistory {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    /// Append a sample, dropping the oldest once full
    pub fn push(&mut self, ms: f32) {
        if self.samples.len() == HISTORY_LEN {
            self.samples.pop_front();
        }
        self.samples.push_back(ms);
    }

    pub fn latest(&self) -> Option<f32> {
        self.samples.back().copied()
    }

    /// Mean of the retained samples, 0 when empty
    pub fn average(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f32>() / self.samples.len() as f32
    }

    pub fn max(&self) -> f32 {
        self.samples.iter().copied().fold(0.0, f32::max)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().copied()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Frame counter that publishes a rounded FPS figure once more than
/// [`FPS_WINDOW`] has passed since the last one
#[derive(Debug, Clone, Copy)]
pub struct FpsCounter {
    frames: u32,
    window_start: Instant,
    fps: u32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            window_start: now,
            fps: 0,
        }
    }

    /// Count one frame; returns the new figure when a window closes
    pub fn tick(&mut self, now: Instant) -> Option<u32> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed <= FPS_WINDOW {
            return None;
        }

        self.fps = (self.frames as f64 / elapsed.as_secs_f64()).round() as u32;
        self.frames = 0;
        self.window_start = now;
        Some(self.fps)
    }

    /// Last published figure
    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn reset(&mut self, now: Instant) {
        *self = Self::new(now);
    }
}

/// Summary of one engine's recent performance
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PerformanceMetrics {
    /// Most recent step time
    pub ms: f32,
    pub fps: u32,
    /// Mean step time over the history
    pub avg: f32,
}

impl PerformanceMetrics {
    pub fn snapshot(history: &PerformanceHistory, counter: &FpsCounter) -> Self {
        Self {
            ms: history.latest().unwrap_or(0.0),
            fps: counter.fps(),
            avg: history.average(),
        }
    }
}
