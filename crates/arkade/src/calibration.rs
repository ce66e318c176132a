use crate::config::CalibrationConfig;
use crate::control::DistanceRange;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationOutcome {
    Range(DistanceRange),
    /// No two-hand pinch was seen during the session.
    NoSamples,
}

/// Collects two-hand pinch distances for a fixed window, then widens the
/// observed extremes by the configured margins.
#[derive(Debug, Clone)]
pub struct Calibration {
    started_at: Option<f64>,
    samples: Vec<f64>,
    cfg: CalibrationConfig,
}

impl Calibration {
    pub fn new(cfg: CalibrationConfig) -> Self {
        Self {
            started_at: None,
            samples: Vec::new(),
            cfg,
        }
    }

    pub fn set_config(&mut self, cfg: CalibrationConfig) {
        self.cfg = cfg;
    }

    /// Starts a session, discarding any running one.
    pub fn start(&mut self, now: f64) {
        log::info!("Calibration started ({:.0}ms)", self.cfg.duration_ms);
        self.started_at = Some(now);
        self.samples.clear();
    }

    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn record(&mut self, distance: f64) {
        if self.is_active() && distance.is_finite() {
            self.samples.push(distance);
        }
    }

    pub fn progress(&self, now: f64) -> Option<f64> {
        let started = self.started_at?;
        if self.cfg.duration_ms <= 0.0 {
            return Some(1.0);
        }
        Some(((now - started) / self.cfg.duration_ms).clamp(0.0, 1.0))
    }

    /// Finishes the session once its window has passed.
    pub fn poll(&mut self, now: f64) -> Option<CalibrationOutcome> {
        let started = self.started_at?;
        if now - started < self.cfg.duration_ms {
            return None;
        }
        self.started_at = None;

        let samples = std::mem::take(&mut self.samples);
        let min = samples.iter().copied().reduce(f64::min);
        let max = samples.iter().copied().reduce(f64::max);
        match (min, max) {
            (Some(min), Some(max)) if min * self.cfg.min_margin < max * self.cfg.max_margin => {
                Some(CalibrationOutcome::Range(DistanceRange {
                    min: min * self.cfg.min_margin,
                    max: max * self.cfg.max_margin,
                }))
            }
            _ => Some(CalibrationOutcome::NoSamples),
        }
    }
}
