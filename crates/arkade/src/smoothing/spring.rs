use serde::{Deserialize, Serialize};

pub const REST_EPSILON: f64 = 0.001;

/// Stiffness and damping of a [`Spring`], both in `(0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringParams {
    pub stiffness: f64,
    pub damping: f64,
}

impl SpringParams {
    pub const fn new(stiffness: f64, damping: f64) -> Self {
        Self { stiffness, damping }
    }

    pub fn is_valid(&self) -> bool {
        let unit = |v: f64| v > 0.0 && v < 1.0;
        unit(self.stiffness) && unit(self.damping)
    }
}

/// Discrete damped spring, stepped once per rendered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Spring {
    value: f64,
    target: f64,
    velocity: f64,
    params: SpringParams,
}

impl Spring {
    pub fn new(initial: f64, params: SpringParams) -> Self {
        Self {
            value: initial,
            target: initial,
            velocity: 0.0,
            params,
        }
    }

    pub fn update(&mut self) {
        self.velocity += (self.target - self.value) * self.params.stiffness;
        self.velocity *= self.params.damping;
        self.value += self.velocity;

        if self.is_at_rest() {
            self.value = self.target;
            self.velocity = 0.0;
        }
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    /// Jumps straight to `value` with no motion.
    pub fn snap_to(&mut self, value: f64) {
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
    }

    pub fn set_params(&mut self, params: SpringParams) {
        self.params = params;
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn is_at_rest(&self) -> bool {
        (self.value - self.target).abs() < REST_EPSILON && self.velocity.abs() < REST_EPSILON
    }
}
