use std::collections::VecDeque;

const ADVANCE_RATE: f64 = 0.3;
const ADVANCE_EPSILON: f64 = 0.1;

/// One smoothed control parameter: a moving-average `target` over the last
/// few raw samples, and a `current` value eased toward it each frame.
#[derive(Debug, Clone)]
pub struct ControlChannel {
    current: f64,
    target: f64,
    history: VecDeque<f64>,
    window: usize,
}

impl ControlChannel {
    pub fn new(initial: f64, window: usize) -> Self {
        let window = window.max(1);
        Self {
            current: initial,
            target: initial,
            history: VecDeque::with_capacity(window),
            window,
        }
    }

    /// Records a raw sample and returns the new target.
    pub fn push(&mut self, raw: f64) -> f64 {
        if self.history.len() >= self.window {
            self.history.pop_front();
        }
        self.history.push_back(raw);

        self.target = self.history.iter().sum::<f64>() / self.history.len() as f64;
        self.target
    }

    /// Eases `current` toward `target`. Returns whether it moved.
    pub fn advance(&mut self) -> bool {
        if (self.target - self.current).abs() <= ADVANCE_EPSILON {
            return false;
        }
        self.current += (self.target - self.current) * ADVANCE_RATE;
        true
    }

    pub fn reset(&mut self, value: f64) {
        self.history.clear();
        self.current = value;
        self.target = value;
    }

    pub fn set_window(&mut self, window: usize) {
        self.window = window.max(1);
        while self.history.len() > self.window {
            self.history.pop_front();
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_is_mean_of_window() {
        let mut channel = ControlChannel::new(64.0, 3);

        assert_eq!(channel.push(10.0), 10.0);
        assert_eq!(channel.push(20.0), 15.0);
        assert_eq!(channel.push(30.0), 20.0);

        // window is full, oldest sample drops
        assert_eq!(channel.push(40.0), 30.0);
        assert_eq!(channel.history_len(), 3);
    }

    #[test]
    fn test_current_eases_without_jumping() {
        let mut channel = ControlChannel::new(0.0, 3);
        channel.push(100.0);

        assert!(channel.advance());
        assert!((channel.current() - 30.0).abs() < 1e-9);
        assert!(channel.advance());
        assert!((channel.current() - 51.0).abs() < 1e-9);

        for _ in 0..100 {
            channel.advance();
        }
        assert!((channel.target() - channel.current()).abs() <= ADVANCE_EPSILON);
        assert!(!channel.advance());
    }

    #[test]
    fn test_reset() {
        let mut channel = ControlChannel::new(64.0, 3);
        channel.push(0.0);
        channel.reset(64.0);
        assert_eq!(channel.history_len(), 0);
        assert_eq!(channel.current(), 64.0);
        assert_eq!(channel.target(), 64.0);
    }
}
