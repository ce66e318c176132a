use handmark::Landmarks;
use handmark::pose::is_thumbs_up;

/// Fires once when a thumbs-up pose appears, then not again until the pose
/// is dropped and the cooldown has passed.
#[derive(Debug, Clone)]
pub struct ThumbsUpDetector {
    was_up: bool,
    last_fired: Option<f64>,
    cooldown_ms: f64,
    strict: bool,
}

impl ThumbsUpDetector {
    pub fn new(cooldown_ms: f64, strict: bool) -> Self {
        Self {
            was_up: false,
            last_fired: None,
            cooldown_ms,
            strict,
        }
    }

    pub fn update(&mut self, hand: &Landmarks, now: f64) -> bool {
        let up = is_thumbs_up(hand, self.strict);
        let rising = up && !self.was_up;
        self.was_up = up;
        if !rising {
            return false;
        }

        if let Some(last) = self.last_fired
            && now - last < self.cooldown_ms
        {
            log::debug!("Thumbs-up ignored, {:.0}ms since last", now - last);
            return false;
        }

        self.last_fired = Some(now);
        true
    }

    pub fn configure(&mut self, cooldown_ms: f64, strict: bool) {
        self.cooldown_ms = cooldown_ms;
        self.strict = strict;
    }

    /// Forgets the held pose. The cooldown keeps running.
    pub fn reset(&mut self) {
        self.was_up = false;
    }
}
