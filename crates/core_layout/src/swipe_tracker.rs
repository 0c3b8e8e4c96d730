//! Velocity tracking for live gestures.

use std::collections::VecDeque;
use std::time::Duration;

/// Default per-millisecond deceleration used to project a released gesture.
pub const DEFAULT_DECELERATION_RATE: f64 = 0.997;

/// Default length of the history window used for the velocity estimate.
pub const DEFAULT_HISTORY: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy)]
struct Sample {
    delta: f64,
    timestamp: Duration,
}

/// Accumulates `(delta, timestamp)` samples of a gesture.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    history: VecDeque<Sample>,
    pos: f64,
    history_limit: Duration,
    deceleration_rate: f64,
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY, DEFAULT_DECELERATION_RATE)
    }
}

impl SwipeTracker {
    pub fn new(history_limit: Duration, deceleration_rate: f64) -> Self {
        Self {
            history: VecDeque::new(),
            pos: 0.0,
            history_limit,
            deceleration_rate,
        }
    }

    /// Record a sample. Samples older than the history window are dropped.
    pub fn push(&mut self, delta: f64, timestamp: Duration) {
        if let Some(last) = self.history.back() {
            // Out-of-order timestamps would make the velocity meaningless.
            if timestamp < last.timestamp {
                self.history.clear();
            }
        }

        self.history.push_back(Sample { delta, timestamp });
        self.pos += delta;
        self.trim(timestamp);
    }

    fn trim(&mut self, now: Duration) {
        let cutoff = now.saturating_sub(self.history_limit);
        while self
            .history
            .front()
            .is_some_and(|sample| sample.timestamp < cutoff)
        {
            self.history.pop_front();
        }
    }

    /// Total accumulated delta.
    pub fn pos(&self) -> f64 {
        self.pos
    }

    /// Estimated velocity in units per second over the history window.
    pub fn velocity(&self) -> f64 {
        let (Some(first), Some(last)) = (self.history.front(), self.history.back()) else {
            return 0.0;
        };

        let span = last.timestamp.saturating_sub(first.timestamp).as_secs_f64();
        if span <= 0.0 {
            return 0.0;
        }

        // The first sample's delta happened before the window started.
        let total: f64 = self.history.iter().skip(1).map(|s| s.delta).sum();
        total / span
    }

    /// Where the gesture would come to rest if it kept decelerating at the
    /// configured rate from its current velocity.
    pub fn projected_end_pos(&self) -> f64 {
        let rate = self.deceleration_rate;
        if !(0.0..1.0).contains(&rate) || rate == 0.0 {
            return self.pos;
        }
        // Velocity is per second, the rate is per millisecond.
        self.pos - self.velocity() / (1000.0 * rate.ln())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_empty_tracker() {
        let tracker = SwipeTracker::default();
        assert_eq!(tracker.pos(), 0.0);
        assert_eq!(tracker.velocity(), 0.0);
        assert_eq!(tracker.projected_end_pos(), 0.0);
    }

    #[test]
    fn test_constant_velocity() {
        let mut tracker = SwipeTracker::default();
        for i in 0..10 {
            tracker.push(10.0, ms(i * 10));
        }
        assert_eq!(tracker.pos(), 100.0);
        // 10 units every 10ms.
        assert!((tracker.velocity() - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_old_samples_are_forgotten() {
        let mut tracker = SwipeTracker::default();
        tracker.push(500.0, ms(0));
        tracker.push(1.0, ms(400));
        tracker.push(1.0, ms(410));
        assert!((tracker.velocity() - 100.0).abs() < 1e-6);
        assert_eq!(tracker.pos(), 502.0);
    }

    #[test]
    fn test_projection_follows_velocity() {
        let mut tracker = SwipeTracker::default();
        for i in 0..5 {
            tracker.push(-20.0, ms(i * 10));
        }
        let projected = tracker.projected_end_pos();
        assert!(projected < tracker.pos());

        let mut still = SwipeTracker::default();
        still.push(-20.0, ms(0));
        assert_eq!(still.projected_end_pos(), still.pos());
    }

    #[test]
    fn test_out_of_order_resets_history() {
        let mut tracker = SwipeTracker::default();
        tracker.push(10.0, ms(100));
        tracker.push(10.0, ms(110));
        tracker.push(10.0, ms(50));
        assert_eq!(tracker.velocity(), 0.0);
        assert_eq!(tracker.pos(), 30.0);
    }
}
