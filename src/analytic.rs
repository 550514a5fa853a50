//! Closed-form solution of the driven, damped oscillator
//!
//! Solves `m*a + k*v + c*x = c*w(t) + h(t)` exactly for the underdamped case
//! by superposing the homogeneous solution with one particular solution per
//! forcing term, then matching `x0`, `v0` at `t = 0`.

use crate::error::ConfigError;
use crate::forcing::{Forcing, ForcingEvaluator};
use crate::params::OscillatorParameters;

/// A particular solution `x_S(t), v_S(t)` for a single forcing term
///
/// Only the constant-forcing case has an implemented closed form, so both
/// components are constant in time. A correct sinusoidal particular solution
/// has never been derived for this system; that case is rejected at
/// construction rather than guessed.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Particular {
    x: f64,
    v: f64,
}

impl Particular {
    /// Particular solution for forcing `f(t) = a`: `x_S = a/c`, `v_S = 0`
    fn constant(a: f64, stiffness: f64) -> Self {
        Self {
            x: a / stiffness,
            v: 0.0,
        }
    }

    fn scaled(self, factor: f64) -> Self {
        Self {
            x: factor * self.x,
            v: factor * self.v,
        }
    }
}

/// Evaluator of the exact trajectory `x(t)`
///
/// Velocity and acceleration are deliberately not produced here; the stepper
/// derives them by finite differencing consecutive positions, trading an
/// O(dt) error against a second closed form.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticSolver {
    /// Decay rate of the homogeneous solution: `-k/(2m)`
    decay: f64,
    /// Oscillation rate of the homogeneous solution: `sqrt(4cm - k^2)/(2m)`
    omega: f64,
    /// Homogeneous coefficients matched to the initial conditions
    c_coef: f64,
    d_coef: f64,
    /// Particular solution for `h(t)`, unscaled
    part_h: Particular,
    /// Particular solution for `w(t)`, scaled by `c`
    part_cw: Particular,
}

impl AnalyticSolver {
    /// Derive the exact trajectory for validated parameters
    ///
    /// `evaluator` is consulted only for [`Forcing::Unparsed`] terms, which
    /// are probed at `t = 0` and treated as constant for the purposes of the
    /// closed form (the discrete integrators still see the true time-varying
    /// values each tick).
    pub fn new(
        params: &OscillatorParameters,
        h: &Forcing,
        w: &Forcing,
        evaluator: Option<&dyn ForcingEvaluator>,
    ) -> Result<Self, ConfigError> {
        params.validate()?;

        let m = params.mass;
        let k = params.damping;
        let c = params.stiffness;

        // Characteristic roots lambda = A +- B*i; validate() guarantees the
        // radicand is positive.
        let decay = -k / (2.0 * m);
        let omega = (4.0 * c * m - k * k).sqrt() / (2.0 * m);

        let part_h = Self::particular("h", h, c, evaluator)?;
        // w(t) enters the equation as c*w(t)
        let part_cw = Self::particular("w", w, c, evaluator)?.scaled(c);

        // x(0) = C + x_Sh(0) + x_Scw(0)
        // v(0) = A*C + B*D + v_Sh(0) + v_Scw(0)
        let c_coef = params.x0 - part_h.x - part_cw.x;
        let d_coef = (params.v0 - part_h.v - part_cw.v - decay * c_coef) / omega;

        Ok(Self {
            decay,
            omega,
            c_coef,
            d_coef,
            part_h,
            part_cw,
        })
    }

    fn particular(
        term: &'static str,
        forcing: &Forcing,
        stiffness: f64,
        evaluator: Option<&dyn ForcingEvaluator>,
    ) -> Result<Particular, ConfigError> {
        match forcing {
            Forcing::Constant(a) => Ok(Particular::constant(*a, stiffness)),
            Forcing::Sinusoidal { .. } => Err(ConfigError::UnsupportedForcing {
                term,
                reason: "no closed-form particular solution for sinusoidal forcing".to_string(),
            }),
            Forcing::Unparsed(_) => {
                let probed = forcing.eval(0.0, evaluator).map_err(|err| {
                    ConfigError::UnsupportedForcing {
                        term,
                        reason: err.to_string(),
                    }
                })?;
                Ok(Particular::constant(probed, stiffness))
            }
        }
    }

    /// Exact position at time `t`
    pub fn position(&self, t: f64) -> f64 {
        let homogeneous = (self.decay * t).exp()
            * (self.c_coef * (self.omega * t).cos() + self.d_coef * (self.omega * t).sin());
        homogeneous + self.part_h.x + self.part_cw.x
    }

    /// Damped oscillation frequency `B`
    pub fn damped_frequency(&self) -> f64 {
        self.omega
    }
}
