//! Oscillator parameters and their validation
//!
//! The governing equation is `m*a + k*v + c*x = c*w(t) + h(t)` with mass `m`,
//! damping `k`, stiffness `c`, position-driving forcing `w(t)`, and additive
//! forcing `h(t)`. Parameters are an immutable snapshot per simulation run;
//! changing them means restarting.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Immutable parameter snapshot for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscillatorParameters {
    /// Mass `m`, must be positive
    pub mass: f64,
    /// Damping coefficient `k`, must be non-negative
    pub damping: f64,
    /// Spring stiffness `c`, must be positive
    pub stiffness: f64,
    /// Initial position
    pub x0: f64,
    /// Initial velocity
    pub v0: f64,
    /// Fixed integration step, must be positive
    pub dt: f64,
    /// Additive forcing term `h(t)`
    pub h_expr: String,
    /// Position-driving forcing term `w(t)`, enters the equation as `c*w(t)`
    pub w_expr: String,
}

impl Default for OscillatorParameters {
    fn default() -> Self {
        Self {
            mass: 1.0,
            damping: 0.1,
            stiffness: 5.0,
            x0: 50.0,
            v0: 0.0,
            dt: 0.01,
            h_expr: "0".to_string(),
            w_expr: "0".to_string(),
        }
    }
}

impl OscillatorParameters {
    /// Parse the six numeric parameters from text inputs
    ///
    /// A failed parse is reported as an explicit error rather than letting a
    /// NaN thread through the integrators.
    #[allow(clippy::too_many_arguments)]
    pub fn from_text(
        mass: &str,
        damping: &str,
        stiffness: &str,
        x0: &str,
        v0: &str,
        dt: &str,
        h_expr: &str,
        w_expr: &str,
    ) -> Result<Self, ConfigError> {
        let parse = |name: &'static str, text: &str| -> Result<f64, ConfigError> {
            text.trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::InvalidNumber {
                    name,
                    text: text.to_string(),
                })
        };

        Ok(Self {
            mass: parse("mass", mass)?,
            damping: parse("damping", damping)?,
            stiffness: parse("stiffness", stiffness)?,
            x0: parse("x0", x0)?,
            v0: parse("v0", v0)?,
            dt: parse("dt", dt)?,
            h_expr: h_expr.trim().to_string(),
            w_expr: w_expr.trim().to_string(),
        })
    }

    /// Discriminant of the characteristic polynomial: `k^2 - 4*c*m`
    ///
    /// Negative for the underdamped oscillatory case, the only case the
    /// analytic solver implements.
    pub fn discriminant(&self) -> f64 {
        self.damping * self.damping - 4.0 * self.stiffness * self.mass
    }

    /// Check sign constraints, finiteness, and the underdamped precondition
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = |name: &'static str, value: f64| -> Result<(), ConfigError> {
            if value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::NonFinite { name, value })
            }
        };
        finite("mass", self.mass)?;
        finite("damping", self.damping)?;
        finite("stiffness", self.stiffness)?;
        finite("x0", self.x0)?;
        finite("v0", self.v0)?;
        finite("dt", self.dt)?;

        let positive = |name: &'static str, value: f64| -> Result<(), ConfigError> {
            if value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::NonPositive { name, value })
            }
        };
        positive("mass", self.mass)?;
        positive("stiffness", self.stiffness)?;
        positive("dt", self.dt)?;

        if self.damping < 0.0 {
            return Err(ConfigError::Negative {
                name: "damping",
                value: self.damping,
            });
        }

        // The closed form assumes complex-conjugate characteristic roots.
        // Overdamped or critically damped parameter sets are rejected here
        // instead of producing NaN from the square-root term.
        if self.discriminant() >= 0.0 {
            return Err(ConfigError::NotUnderdamped {
                damping_sq: self.damping * self.damping,
                four_cm: 4.0 * self.stiffness * self.mass,
            });
        }

        Ok(())
    }

    /// Undamped natural frequency `sqrt(c/m)`
    pub fn natural_frequency(&self) -> f64 {
        (self.stiffness / self.mass).sqrt()
    }
}
