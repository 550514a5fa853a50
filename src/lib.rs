//! oscsim - damped driven harmonic oscillator simulation
//!
//! Simulates `m*a + k*v + c*x = c*w(t) + h(t)` and compares three numerical
//! regimes side by side:
//!
//! - the closed-form analytic solution (underdamped case),
//! - explicit forward Euler,
//! - velocity-Verlet ("leapfrog").
//!
//! The [`sim::Simulation`] stepper advances all three once per external
//! render tick and pushes decimated samples into fixed-capacity
//! [`ring::RingBuffer`]s, which a display layer reads as sliding
//! time-window series. Rendering, widgets, and chart drawing are
//! collaborator concerns and live outside this crate.
//!
//! # Example
//!
//! ```
//! use oscsim::prelude::*;
//!
//! let mut sim = Simulation::new(OscillatorParameters::default()).unwrap();
//! for _ in 0..100 {
//!     let tick = sim.step().unwrap();
//!     let _ = tick.analytic.position;
//! }
//! assert_eq!(sim.position_series(Method::Analytic).len(), 10);
//! ```

pub mod analytic;
pub mod error;
pub mod forcing;
pub mod params;
pub mod ring;
pub mod sim;
pub mod solvers;
pub mod state;

pub use analytic::AnalyticSolver;
pub use error::{ConfigError, EvalError, StepError};
pub use forcing::{Forcing, ForcingEvaluator};
pub use params::OscillatorParameters;
pub use ring::{RingBuffer, RingError};
pub use sim::{ForcingSample, Sample, Simulation, SimulationBuilder, Tick};
pub use state::{Method, MethodState};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::analytic::AnalyticSolver;
    pub use crate::error::{ConfigError, EvalError, StepError};
    pub use crate::forcing::{Forcing, ForcingEvaluator};
    pub use crate::params::OscillatorParameters;
    pub use crate::ring::{RingBuffer, RingError};
    pub use crate::sim::{ForcingSample, Sample, Simulation, SimulationBuilder, Tick};
    pub use crate::solvers::{ExplicitEuler, Integrator, SystemCoeffs, VelocityVerlet};
    pub use crate::state::{Method, MethodState};
}
