//! Velocity-Verlet ("leapfrog") method

use super::{Integrator, SystemCoeffs};
use crate::state::MethodState;

/// Velocity-Verlet integrator
///
/// # Mathematical Form
/// ```text
/// x_{n+1} = x_n + v_n*dt + 0.5*a_n*dt^2
/// a_new   = (c*(w - x_{n+1}) - k*v_n + h) / m
/// v_{n+1} = v_n + 0.5*(a_n + a_new)*dt
/// ```
///
/// # Characteristics
/// - Order: 2 for the conservative part of the force
/// - Explicit, fixed timestep
/// - Markedly better long-run energy behavior than forward Euler
///
/// # Note
/// The new acceleration is evaluated at the updated position but the
/// pre-step velocity, so the damping contribution lags by one step. This is
/// a deliberate semi-implicit approximation, not a true symplectic leapfrog
/// for velocity-dependent forces.
#[derive(Debug, Clone, Copy, Default)]
pub struct VelocityVerlet;

impl Integrator for VelocityVerlet {
    fn advance(&self, state: &mut MethodState, coeffs: &SystemCoeffs, h: f64, w: f64, dt: f64) {
        let x = state.position;
        let v = state.velocity;
        // The stored acceleration is 0 at start/restart; priming it on the
        // first step keeps the method second order instead of injecting a
        // one-off O(dt) velocity error.
        let a = if state.step_count == 0 {
            coeffs.acceleration(x, v, h, w)
        } else {
            state.acceleration
        };

        let x_new = x + v * dt + 0.5 * a * dt * dt;
        // Force at the updated position; damping keeps the pre-step velocity
        let a_new = coeffs.acceleration(x_new, v, h, w);

        state.position = x_new;
        state.velocity = v + 0.5 * (a + a_new) * dt;
        state.acceleration = a_new;
        state.time += dt;
        state.step_count += 1;
    }

    fn order(&self) -> usize {
        2
    }

    fn name(&self) -> &'static str {
        "leapfrog"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::ExplicitEuler;
    use approx::assert_relative_eq;

    fn shm_coeffs() -> SystemCoeffs {
        SystemCoeffs {
            mass: 1.0,
            damping: 0.0,
            stiffness: 1.0,
        }
    }

    fn initial() -> MethodState {
        MethodState {
            position: 1.0,
            velocity: 0.0,
            acceleration: 0.0,
            time: 0.0,
            step_count: 0,
        }
    }

    #[test]
    fn test_leapfrog_single_step() {
        let coeffs = SystemCoeffs {
            mass: 2.0,
            damping: 0.5,
            stiffness: 4.0,
        };
        let mut state = MethodState {
            position: 1.0,
            velocity: 2.0,
            acceleration: 1.0,
            time: 0.0,
            step_count: 5,
        };

        VelocityVerlet.advance(&mut state, &coeffs, 1.0, 3.0, 0.1);

        // x' = 1 + 2*0.1 + 0.5*1*0.01 = 1.205
        // a_new = (4*(3 - 1.205) - 0.5*2 + 1) / 2 = 3.59
        // v' = 2 + 0.5*(1 + 3.59)*0.1 = 2.2295
        assert_relative_eq!(state.position, 1.205, epsilon = 1e-12);
        assert_relative_eq!(state.velocity, 2.2295, epsilon = 1e-12);
        assert_relative_eq!(state.acceleration, 3.59, epsilon = 1e-12);
        assert_eq!(state.step_count, 6);
    }

    #[test]
    fn test_leapfrog_primes_acceleration_on_first_step() {
        // x'' = -x, x(0) = 1: a(0) should be treated as -1, not the stored 0
        let coeffs = shm_coeffs();
        let mut state = initial();

        VelocityVerlet.advance(&mut state, &coeffs, 0.0, 0.0, 0.1);

        // x' = 1 + 0 - 0.5*1*0.01 = 0.995
        assert_relative_eq!(state.position, 0.995, epsilon = 1e-12);
    }

    #[test]
    fn test_leapfrog_cosine_approximation() {
        let coeffs = shm_coeffs();
        let mut state = initial();

        let dt = 0.01;
        for _ in 0..100 {
            VelocityVerlet.advance(&mut state, &coeffs, 0.0, 0.0, dt);
        }

        // Second-order method: much tighter tolerance than Euler
        assert_relative_eq!(state.position, 1.0_f64.cos(), epsilon = 1e-4);
    }

    #[test]
    fn test_leapfrog_energy_drift_smaller_than_euler() {
        let coeffs = shm_coeffs();
        let dt = 0.05;
        let steps = 2000;

        let mut frog = initial();
        let mut euler = initial();
        let e0 = frog.energy(coeffs.mass, coeffs.stiffness);

        for _ in 0..steps {
            VelocityVerlet.advance(&mut frog, &coeffs, 0.0, 0.0, dt);
            ExplicitEuler.advance(&mut euler, &coeffs, 0.0, 0.0, dt);
        }

        let frog_drift = (frog.energy(coeffs.mass, coeffs.stiffness) - e0).abs();
        let euler_drift = (euler.energy(coeffs.mass, coeffs.stiffness) - e0).abs();

        assert!(
            frog_drift < euler_drift / 10.0,
            "leapfrog drift {frog_drift} not well below euler drift {euler_drift}"
        );
        // Energy stays bounded near E0 = 0.5 rather than growing with N
        assert!(frog_drift < 0.01, "leapfrog drift {frog_drift} not bounded");
    }
}
