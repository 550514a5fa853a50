//! Forcing-term classification and evaluation
//!
//! Forcing terms arrive as opaque text. Classification is decoupled from
//! evaluation: a plain number becomes [`Forcing::Constant`], the recognized
//! sinusoid shapes become [`Forcing::Sinusoidal`], and anything else stays
//! [`Forcing::Unparsed`] and is handed to an external [`ForcingEvaluator`]
//! at evaluation time.

use serde::{Deserialize, Serialize};

use crate::error::EvalError;

/// External expression-evaluator boundary
///
/// Given an opaque expression and a time value, produce a real number. The
/// implementation (and its expression language) is a collaborator concern;
/// failures are reported per call and never poison the simulation state.
pub trait ForcingEvaluator {
    fn eval(&self, expr: &str, t: f64) -> Result<f64, EvalError>;
}

impl<F> ForcingEvaluator for F
where
    F: Fn(&str, f64) -> Result<f64, EvalError>,
{
    fn eval(&self, expr: &str, t: f64) -> Result<f64, EvalError> {
        self(expr, t)
    }
}

/// A classified forcing term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Forcing {
    /// `f(t) = value`
    Constant(f64),
    /// `f(t) = amplitude * sin(frequency * t + phase)`
    ///
    /// Evaluates directly; the analytic solver has no particular solution
    /// for this case and rejects it at construction.
    Sinusoidal {
        amplitude: f64,
        frequency: f64,
        phase: f64,
    },
    /// Unrecognized expression, deferred to an external evaluator
    Unparsed(String),
}

impl Forcing {
    /// Classify a forcing expression
    ///
    /// Recognizes plain numbers and the shapes `A*sin(W*t)`, `A*cos(W*t)`,
    /// `sin(W*t)`, `cos(W*t)`, `sin(t)`, `cos(t)`. Everything else is kept
    /// verbatim as [`Forcing::Unparsed`].
    pub fn classify(text: &str) -> Self {
        let text = text.trim();

        if let Ok(value) = text.parse::<f64>() {
            return Forcing::Constant(value);
        }

        if let Some(sinusoid) = parse_sinusoid(text) {
            return sinusoid;
        }

        Forcing::Unparsed(text.to_string())
    }

    /// Evaluate the term at time `t`
    ///
    /// `evaluator` is required only for [`Forcing::Unparsed`]. A non-finite
    /// result is reported as [`EvalError::NonFinite`] rather than returned.
    pub fn eval(
        &self,
        t: f64,
        evaluator: Option<&dyn ForcingEvaluator>,
    ) -> Result<f64, EvalError> {
        let value = match self {
            Forcing::Constant(value) => *value,
            Forcing::Sinusoidal {
                amplitude,
                frequency,
                phase,
            } => amplitude * (frequency * t + phase).sin(),
            Forcing::Unparsed(expr) => match evaluator {
                Some(evaluator) => evaluator.eval(expr, t)?,
                None => return Err(EvalError::NoEvaluator(expr.clone())),
            },
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvalError::NonFinite {
                expr: self.describe(),
                time: t,
            })
        }
    }

    /// Short human-readable description for error reports
    pub fn describe(&self) -> String {
        match self {
            Forcing::Constant(value) => format!("{value}"),
            Forcing::Sinusoidal {
                amplitude,
                frequency,
                phase,
            } => format!("{amplitude}*sin({frequency}*t + {phase})"),
            Forcing::Unparsed(expr) => expr.clone(),
        }
    }
}

/// Recognize `[A*]sin(arg)` and `[A*]cos(arg)` with `arg` one of `t`, `W*t`
fn parse_sinusoid(text: &str) -> Option<Forcing> {
    let compact: String = text.chars().filter(|ch| !ch.is_whitespace()).collect();

    let (amplitude, rest) = match compact.find('*') {
        Some(star) if compact[star + 1..].starts_with("sin") || compact[star + 1..].starts_with("cos") => {
            (compact[..star].parse::<f64>().ok()?, &compact[star + 1..])
        }
        _ => (1.0, compact.as_str()),
    };

    // cos(x) = sin(x + pi/2)
    let (phase, rest) = if let Some(rest) = rest.strip_prefix("sin") {
        (0.0, rest)
    } else if let Some(rest) = rest.strip_prefix("cos") {
        (std::f64::consts::FRAC_PI_2, rest)
    } else {
        return None;
    };

    let arg = rest.strip_prefix('(')?.strip_suffix(')')?;
    let frequency = if arg == "t" {
        1.0
    } else {
        arg.strip_suffix("*t")?.parse::<f64>().ok()?
    };

    Some(Forcing::Sinusoidal {
        amplitude,
        frequency,
        phase,
    })
}
