//! Time management utilities

use std::time::{Duration, Instant};

/// High-precision timer for frame timing
///
/// The engine pauses the timer while the window is out of focus, so
/// `delta_time` reads zero for those frames and `total_time` only counts
/// simulated time.
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
    paused: bool,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new running timer
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
            paused: false,
        }
    }

    /// Update the timer; call once per frame before the update step
    pub fn update(&mut self) {
        let now = Instant::now();
        if self.paused {
            self.delta_time = 0.0;
        } else {
            self.delta_time = now.duration_since(self.last_frame).as_secs_f32();
            self.total_time += self.delta_time;
        }
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Stop accumulating time until [`Timer::resume`]
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume accumulating time
    pub fn resume(&mut self) {
        self.paused = false;
        self.last_frame = Instant::now();
    }

    /// Whether the timer is currently paused
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Time since the last frame in seconds (zero while paused)
    #[must_use]
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Total unpaused time since timer creation in seconds
    #[must_use]
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Number of frames observed
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Average FPS over the unpaused lifetime
    #[must_use]
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}

/// Simple stopwatch for measuring elapsed wall time
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    #[must_use]
    pub fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    #[must_use]
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Stop the stopwatch and accumulate elapsed time
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time.take() {
            self.elapsed += start.elapsed();
        }
    }

    /// Get the elapsed time
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        let running = self
            .start_time
            .map_or(Duration::ZERO, |start| start.elapsed());
        self.elapsed + running
    }

    /// Get the elapsed time in seconds
    #[must_use]
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }

    /// Check if the stopwatch is currently running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paused_timer_reports_zero_delta() {
        let mut timer = Timer::new();
        timer.pause();
        std::thread::sleep(Duration::from_millis(2));
        timer.update();

        assert_eq!(timer.delta_time(), 0.0);
        assert_eq!(timer.total_time(), 0.0);
        assert_eq!(timer.frame_count(), 1);
    }

    #[test]
    fn test_timer_accumulates_after_resume() {
        let mut timer = Timer::new();
        timer.pause();
        timer.update();
        timer.resume();
        std::thread::sleep(Duration::from_millis(2));
        timer.update();

        assert!(timer.delta_time() > 0.0);
        assert!(timer.total_time() > 0.0);
    }

    #[test]
    fn test_stopwatch_stop_freezes_elapsed() {
        let mut stopwatch = Stopwatch::start_new();
        std::thread::sleep(Duration::from_millis(2));
        stopwatch.stop();
        let frozen = stopwatch.elapsed();
        std::thread::sleep(Duration::from_millis(2));

        assert_eq!(stopwatch.elapsed(), frozen);
        assert!(!stopwatch.is_running());
    }
}
