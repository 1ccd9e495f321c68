//! Frame timing shown in the GUI

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Frame times over the last second
pub struct FrameStats {
    frame_times: VecDeque<Instant>,
    fps: f32,
    last_update: Instant,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl FrameStats {
    pub fn new(now: Instant) -> Self {
        Self {
            frame_times: VecDeque::new(),
            fps: 0.0,
            last_update: now,
        }
    }

    /// Record a frame presented at `now`
    pub fn record_frame(&mut self, now: Instant) {
        self.frame_times.push_back(now);

        let cutoff = now.checked_sub(Duration::from_secs(1)).unwrap_or(now);
        while self.frame_times.front().is_some_and(|&t| t < cutoff) {
            self.frame_times.pop_front();
        }

        // Refresh four times a second so the label stays readable
        if now.duration_since(self.last_update) > Duration::from_millis(250) {
            self.fps = self.frame_times.len() as f32;
            self.last_update = now;
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn frame_ms(&self) -> Option<f32> {
        (self.fps > 0.0).then(|| 1000.0 / self.fps)
    }

    pub fn ui(&self, ui: &mut egui::Ui) {
        match self.frame_ms() {
            Some(ms) => ui.monospace(format!("{:.3} ms/frame ({:.0} FPS)", ms, self.fps)),
            None => ui.monospace("-- ms/frame"),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_frames_in_last_second() {
        let start = Instant::now();
        let mut stats = FrameStats::new(start);
        for i in 1..=60 {
            stats.record_frame(start + Duration::from_millis(i * 5));
        }
        // Only the update after 250ms has taken a sample
        assert_eq!(stats.fps(), 51.0);
        assert!(stats.frame_ms().is_some());
    }

    #[test]
    fn old_frames_expire() {
        let start = Instant::now();
        let mut stats = FrameStats::new(start);
        stats.record_frame(start + Duration::from_millis(10));
        stats.record_frame(start + Duration::from_millis(20));
        stats.record_frame(start + Duration::from_millis(1500));
        assert_eq!(stats.fps(), 1.0);
    }

    #[test]
    fn no_frames_means_no_timing() {
        let stats = FrameStats::new(Instant::now());
        assert_eq!(stats.frame_ms(), None);
    }
}
