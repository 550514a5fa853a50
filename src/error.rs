//! Error types shared across the crate

use thiserror::Error;

/// Configuration errors, reported at construction and fatal to that run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Parameter `{name}` must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("Parameter `{name}` must be non-negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("Parameter `{name}` is not a finite number: {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("Cannot parse `{text}` as a number for parameter `{name}`")]
    InvalidNumber { name: &'static str, text: String },

    #[error(
        "System is not underdamped: damping^2 = {damping_sq} >= 4*stiffness*mass = {four_cm}"
    )]
    NotUnderdamped { damping_sq: f64, four_cm: f64 },

    #[error("No closed-form particular solution for forcing term `{term}`: {reason}")]
    UnsupportedForcing { term: &'static str, reason: String },

    #[error("Series window capacity must be positive")]
    ZeroWindow,

    #[error("Decimation stride must be positive")]
    ZeroStride,
}

/// Forcing-expression evaluation errors, reported per tick and recoverable
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Expression `{0}` requires an external evaluator, but none was provided")]
    NoEvaluator(String),

    #[error("Evaluator failed on `{expr}` at t = {time}: {message}")]
    Evaluator {
        expr: String,
        time: f64,
        message: String,
    },

    #[error("Expression `{expr}` evaluated to a non-finite value at t = {time}")]
    NonFinite { expr: String, time: f64 },
}

/// A failed simulation tick
///
/// The tick is halted atomically: no method state, counter, or series buffer
/// advances when this is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepError {
    #[error("Evaluation of {term}(t) failed at t = {time}: {source}")]
    Evaluation {
        term: &'static str,
        time: f64,
        source: EvalError,
    },
}
