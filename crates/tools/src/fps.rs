use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Frames per second over a sliding time window.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window: Duration,
    stamps: VecDeque<Instant>,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl FpsCounter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            stamps: VecDeque::new(),
        }
    }

    /// Record a presented frame at `now`.
    pub fn tick(&mut self, now: Instant) {
        self.stamps.push_back(now);
        while let Some(&front) = self.stamps.front() {
            if now.duration_since(front) > self.window {
                self.stamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Average rate across the window; 0 until two frames are recorded.
    pub fn fps(&self) -> f32 {
        let (Some(first), Some(last)) = (self.stamps.front(), self.stamps.back()) else {
            return 0.0;
        };
        let span = last.duration_since(*first).as_secs_f32();
        if span <= 0.0 {
            return 0.0;
        }
        (self.stamps.len() - 1) as f32 / span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_counter_reports_zero() {
        let fps = FpsCounter::default();
        assert_eq!(fps.fps(), 0.0);
    }

    #[test]
    fn steady_sixty_hz() {
        let mut fps = FpsCounter::default();
        let start = Instant::now();
        for i in 0..=60u64 {
            fps.tick(start + Duration::from_micros(i * 16_667));
        }
        assert!((fps.fps() - 60.0).abs() < 0.5);
    }

    #[test]
    fn old_frames_fall_out_of_the_window() {
        let mut fps = FpsCounter::new(Duration::from_millis(500));
        let start = Instant::now();
        for i in 0..10u64 {
            fps.tick(start + Duration::from_millis(i * 10));
        }
        fps.tick(start + Duration::from_secs(5));
        fps.tick(start + Duration::from_secs(5) + Duration::from_millis(100));
        assert!((fps.fps() - 10.0).abs() < 0.01);
    }
}
