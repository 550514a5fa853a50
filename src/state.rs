//! Per-method kinematic state

use serde::{Deserialize, Serialize};

use crate::params::OscillatorParameters;

/// The three numerical regimes under comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    /// Closed-form solution of the governing ODE
    Analytic,
    /// Explicit forward Euler, order 1
    Euler,
    /// Velocity-Verlet ("leapfrog"), order 2
    Leapfrog,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Analytic => "analytic",
            Method::Euler => "euler",
            Method::Leapfrog => "leapfrog",
        }
    }
}

/// Kinematic state of one method, mutated once per tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MethodState {
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub time: f64,
    pub step_count: u64,
}

impl MethodState {
    /// Initial state at simulation start or restart
    pub fn initial(params: &OscillatorParameters) -> Self {
        Self {
            position: params.x0,
            velocity: params.v0,
            acceleration: 0.0,
            time: 0.0,
            step_count: 0,
        }
    }

    /// Mechanical energy `E = m*v^2/2 + c*x^2/2` for the given system
    ///
    /// Conserved for the undamped, unforced oscillator; used to compare
    /// long-run drift between integrators.
    pub fn energy(&self, mass: f64, stiffness: f64) -> f64 {
        0.5 * mass * self.velocity * self.velocity
            + 0.5 * stiffness * self.position * self.position
    }
}
