//! Explicit forward Euler method

use super::{Integrator, SystemCoeffs};
use crate::state::MethodState;

/// Explicit forward Euler on the equivalent first-order system
///
/// # Mathematical Form
/// ```text
/// x_{n+1} = x_n + dt * v_n
/// v_{n+1} = v_n + dt * (c*(w - x_n) - k*v_n + h) / m
/// ```
///
/// # Characteristics
/// - Order: 1
/// - Explicit, fixed timestep
/// - Not A-stable
///
/// # Note
/// Unconditionally defined for any finite inputs, but diverges for large `dt`
/// relative to the system's natural frequency. That divergence is part of the
/// method comparison this crate exists to show, so it is preserved rather
/// than guarded against.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitEuler;

impl Integrator for ExplicitEuler {
    fn advance(&self, state: &mut MethodState, coeffs: &SystemCoeffs, h: f64, w: f64, dt: f64) {
        let x = state.position;
        let v = state.velocity;
        let a = coeffs.acceleration(x, v, h, w);

        state.position = x + dt * v;
        state.velocity = v + dt * a;
        state.acceleration = a;
        state.time += dt;
        state.step_count += 1;
    }

    fn order(&self) -> usize {
        1
    }

    fn name(&self) -> &'static str {
        "euler"
    }
}
