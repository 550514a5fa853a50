//! Discrete fixed-step integrators for the oscillator equation
//!
//! Both integrators advance one [`MethodState`](crate::state::MethodState) by
//! one step from the instantaneous forcing samples `h`, `w`. Instability of
//! the explicit methods at large `dt` is an expected property of the method,
//! not an error.

mod euler;
mod leapfrog;

pub use euler::ExplicitEuler;
pub use leapfrog::VelocityVerlet;

use crate::params::OscillatorParameters;
use crate::state::MethodState;

/// Constant coefficients of `m*a + k*v + c*x = c*w(t) + h(t)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemCoeffs {
    pub mass: f64,
    pub damping: f64,
    pub stiffness: f64,
}

impl SystemCoeffs {
    pub fn from_params(params: &OscillatorParameters) -> Self {
        Self {
            mass: params.mass,
            damping: params.damping,
            stiffness: params.stiffness,
        }
    }

    /// Instantaneous acceleration `(c*(w - x) - k*v + h) / m`
    #[inline]
    pub fn acceleration(&self, x: f64, v: f64, h: f64, w: f64) -> f64 {
        (self.stiffness * (w - x) - self.damping * v + h) / self.mass
    }
}

/// One-step fixed-dt integrator
pub trait Integrator {
    /// Advance `state` by one step of size `dt` using the forcing samples
    /// `h`, `w` taken at the end of the step
    fn advance(&self, state: &mut MethodState, coeffs: &SystemCoeffs, h: f64, w: f64, dt: f64);

    /// Local truncation-error order of the method
    fn order(&self) -> usize;

    fn name(&self) -> &'static str;
}
