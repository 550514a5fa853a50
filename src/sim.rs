//! Simulation stepper: one discrete advance per render tick
//!
//! [`Simulation`] owns all mutable state: the three per-method kinematic
//! states and the ten display-facing series buffers. It runs synchronously,
//! one `step()` per external tick; a tick either completes fully or reports
//! an error with nothing advanced.

use std::fmt;
use std::io::Write;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::analytic::AnalyticSolver;
use crate::error::{ConfigError, StepError};
use crate::forcing::{Forcing, ForcingEvaluator};
use crate::params::OscillatorParameters;
use crate::ring::RingBuffer;
use crate::solvers::{ExplicitEuler, Integrator, SystemCoeffs, VelocityVerlet};
use crate::state::{Method, MethodState};

/// Default capacity of each series window
pub const DEFAULT_WINDOW: usize = 200;

/// Default decimation stride: ticks between two recorded samples
pub const DEFAULT_STRIDE: u64 = 10;

/// One recorded point: `(t, value)` for time series, `(x, v)` for
/// trajectories
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
}

/// Forcing values and derived forces for the current tick; recomputed every
/// tick, never persisted beyond it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForcingSample {
    pub time: f64,
    /// Additive forcing `h(t)`
    pub h: f64,
    /// Position-driving forcing `w(t)`
    pub w: f64,
    /// Effective spring-coupling force `f = c*(w - x)` for the analytic
    /// trajectory
    pub f: f64,
    /// Damping force `g = -k*v` for the analytic trajectory
    pub g: f64,
}

/// Snapshot of a completed tick, consumed by the display collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub time: f64,
    pub forcing: ForcingSample,
    pub analytic: MethodState,
    pub euler: MethodState,
    pub leapfrog: MethodState,
}

/// Builder for [`Simulation`]
pub struct SimulationBuilder {
    params: OscillatorParameters,
    window: usize,
    stride: u64,
    evaluator: Option<Box<dyn ForcingEvaluator>>,
}

impl SimulationBuilder {
    pub fn new(params: OscillatorParameters) -> Self {
        Self {
            params,
            window: DEFAULT_WINDOW,
            stride: DEFAULT_STRIDE,
            evaluator: None,
        }
    }

    /// Capacity of each series ring buffer
    pub fn window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Record one sample every `stride` ticks
    pub fn stride(mut self, stride: u64) -> Self {
        self.stride = stride;
        self
    }

    /// External evaluator for unrecognized forcing expressions
    pub fn evaluator(mut self, evaluator: Box<dyn ForcingEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn build(self) -> Result<Simulation, ConfigError> {
        if self.window == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.stride == 0 {
            return Err(ConfigError::ZeroStride);
        }

        let forcing_h = Forcing::classify(&self.params.h_expr);
        let forcing_w = Forcing::classify(&self.params.w_expr);
        let analytic = AnalyticSolver::new(
            &self.params,
            &forcing_h,
            &forcing_w,
            self.evaluator.as_deref(),
        )?;

        let initial = MethodState::initial(&self.params);
        let window = self.window;
        let series = move || {
            // window > 0 was checked above
            RingBuffer::with_capacity(window).expect("window capacity is positive")
        };

        Ok(Simulation {
            coeffs: SystemCoeffs::from_params(&self.params),
            params: self.params,
            forcing_h,
            forcing_w,
            evaluator: self.evaluator,
            analytic,
            euler_method: ExplicitEuler,
            leapfrog_method: VelocityVerlet,
            exact: initial,
            euler: initial,
            leapfrog: initial,
            stride: self.stride,
            position_exact: series(),
            position_euler: series(),
            position_leapfrog: series(),
            forcing_h_series: series(),
            forcing_w_series: series(),
            spring_force: series(),
            damping_force: series(),
            trajectory_exact: series(),
            trajectory_euler: series(),
            trajectory_leapfrog: series(),
        })
    }
}

/// The simulation: parameters, per-method states, and series buffers
///
/// Single-threaded and exclusively owned; a restart between ticks is atomic
/// because no tick can run concurrently with it.
pub struct Simulation {
    params: OscillatorParameters,
    coeffs: SystemCoeffs,
    forcing_h: Forcing,
    forcing_w: Forcing,
    evaluator: Option<Box<dyn ForcingEvaluator>>,
    analytic: AnalyticSolver,
    euler_method: ExplicitEuler,
    leapfrog_method: VelocityVerlet,

    exact: MethodState,
    euler: MethodState,
    leapfrog: MethodState,

    stride: u64,
    position_exact: RingBuffer<Sample>,
    position_euler: RingBuffer<Sample>,
    position_leapfrog: RingBuffer<Sample>,
    forcing_h_series: RingBuffer<Sample>,
    forcing_w_series: RingBuffer<Sample>,
    spring_force: RingBuffer<Sample>,
    damping_force: RingBuffer<Sample>,
    trajectory_exact: RingBuffer<Sample>,
    trajectory_euler: RingBuffer<Sample>,
    trajectory_leapfrog: RingBuffer<Sample>,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("params", &self.params)
            .field("time", &self.exact.time)
            .field("step_count", &self.exact.step_count)
            .field("evaluator", &self.evaluator.as_ref().map(|_| "<dyn>"))
            .finish()
    }
}

impl Simulation {
    /// Build with default window and stride
    pub fn new(params: OscillatorParameters) -> Result<Self, ConfigError> {
        SimulationBuilder::new(params).build()
    }

    pub fn builder(params: OscillatorParameters) -> SimulationBuilder {
        SimulationBuilder::new(params)
    }

    /// Advance all three methods by one step of `dt`
    ///
    /// Both forcing terms are evaluated before any state mutation; if either
    /// fails, the tick is abandoned with time, states, counters, and buffers
    /// exactly as they were.
    pub fn step(&mut self) -> Result<Tick, StepError> {
        let dt = self.params.dt;
        let t = self.exact.time + dt;

        let evaluator = self.evaluator.as_deref();
        let w = self
            .forcing_w
            .eval(t, evaluator)
            .map_err(|source| self.eval_failure("w", t, source))?;
        let h = self
            .forcing_h
            .eval(t, evaluator)
            .map_err(|source| self.eval_failure("h", t, source))?;

        // Analytic position, with velocity and acceleration recovered by
        // first and second-order finite differencing (O(dt) error).
        let x_prev = self.exact.position;
        let v_prev = self.exact.velocity;
        let x = self.analytic.position(t);
        let v = (x - x_prev) / dt;
        let a = (v - v_prev) / dt;
        self.exact = MethodState {
            position: x,
            velocity: v,
            acceleration: a,
            time: t,
            step_count: self.exact.step_count + 1,
        };

        // The discrete methods consume the same forcing samples.
        self.euler_method
            .advance(&mut self.euler, &self.coeffs, h, w, dt);
        self.leapfrog_method
            .advance(&mut self.leapfrog, &self.coeffs, h, w, dt);

        let forcing = ForcingSample {
            time: t,
            h,
            w,
            f: self.coeffs.stiffness * (w - x),
            g: -self.coeffs.damping * v,
        };

        if self.exact.step_count % self.stride == 0 {
            self.record(&forcing);
        }

        Ok(Tick {
            time: t,
            forcing,
            analytic: self.exact,
            euler: self.euler,
            leapfrog: self.leapfrog,
        })
    }

    fn eval_failure(
        &self,
        term: &'static str,
        time: f64,
        source: crate::error::EvalError,
    ) -> StepError {
        warn!("tick halted: {term}(t) failed at t = {time}: {source}");
        StepError::Evaluation { term, time, source }
    }

    fn record(&mut self, forcing: &ForcingSample) {
        let t = forcing.time;

        self.forcing_h_series.push(Sample { x: t, y: forcing.h });
        self.forcing_w_series.push(Sample { x: t, y: forcing.w });
        self.spring_force.push(Sample { x: t, y: forcing.f });
        self.damping_force.push(Sample { x: t, y: forcing.g });

        self.position_exact.push(Sample {
            x: t,
            y: self.exact.position,
        });
        self.position_euler.push(Sample {
            x: t,
            y: self.euler.position,
        });
        self.position_leapfrog.push(Sample {
            x: t,
            y: self.leapfrog.position,
        });

        self.trajectory_exact.push(Sample {
            x: self.exact.position,
            y: self.exact.velocity,
        });
        self.trajectory_euler.push(Sample {
            x: self.euler.position,
            y: self.euler.velocity,
        });
        self.trajectory_leapfrog.push(Sample {
            x: self.leapfrog.position,
            y: self.leapfrog.velocity,
        });
    }

    /// Reset to the initial conditions, clearing every series buffer
    pub fn reset(&mut self) {
        debug!("simulation reset at t = {}", self.exact.time);

        let initial = MethodState::initial(&self.params);
        self.exact = initial;
        self.euler = initial;
        self.leapfrog = initial;

        self.position_exact.clear();
        self.position_euler.clear();
        self.position_leapfrog.clear();
        self.forcing_h_series.clear();
        self.forcing_w_series.clear();
        self.spring_force.clear();
        self.damping_force.clear();
        self.trajectory_exact.clear();
        self.trajectory_euler.clear();
        self.trajectory_leapfrog.clear();
    }

    /// Restart with a fresh parameter snapshot from the UI collaborator
    ///
    /// Validation failure leaves the running simulation untouched.
    pub fn restart(&mut self, params: OscillatorParameters) -> Result<(), ConfigError> {
        let forcing_h = Forcing::classify(&params.h_expr);
        let forcing_w = Forcing::classify(&params.w_expr);
        let analytic =
            AnalyticSolver::new(&params, &forcing_h, &forcing_w, self.evaluator.as_deref())?;

        self.coeffs = SystemCoeffs::from_params(&params);
        self.params = params;
        self.forcing_h = forcing_h;
        self.forcing_w = forcing_w;
        self.analytic = analytic;
        self.reset();
        Ok(())
    }

    pub fn params(&self) -> &OscillatorParameters {
        &self.params
    }

    /// Current simulation time
    pub fn time(&self) -> f64 {
        self.exact.time
    }

    /// Ticks completed since the last restart
    pub fn step_count(&self) -> u64 {
        self.exact.step_count
    }

    pub fn state(&self, method: Method) -> &MethodState {
        match method {
            Method::Analytic => &self.exact,
            Method::Euler => &self.euler,
            Method::Leapfrog => &self.leapfrog,
        }
    }

    /// Position-vs-time series for one method
    pub fn position_series(&self, method: Method) -> &RingBuffer<Sample> {
        match method {
            Method::Analytic => &self.position_exact,
            Method::Euler => &self.position_euler,
            Method::Leapfrog => &self.position_leapfrog,
        }
    }

    /// Position-vs-velocity trajectory for one method
    pub fn trajectory_series(&self, method: Method) -> &RingBuffer<Sample> {
        match method {
            Method::Analytic => &self.trajectory_exact,
            Method::Euler => &self.trajectory_euler,
            Method::Leapfrog => &self.trajectory_leapfrog,
        }
    }

    /// `h(t)` forcing samples
    pub fn forcing_h_series(&self) -> &RingBuffer<Sample> {
        &self.forcing_h_series
    }

    /// `w(t)` forcing samples
    pub fn forcing_w_series(&self) -> &RingBuffer<Sample> {
        &self.forcing_w_series
    }

    /// Spring-coupling force `f(t) = c*(w - x)`
    pub fn spring_force_series(&self) -> &RingBuffer<Sample> {
        &self.spring_force
    }

    /// Damping force `g(t) = -k*v`
    pub fn damping_force_series(&self) -> &RingBuffer<Sample> {
        &self.damping_force
    }

    /// Write the three recorded position series as CSV
    ///
    /// Rows are the retained window oldest-to-newest; all three series are
    /// recorded on the same ticks, so they stay aligned.
    pub fn write_csv<W: Write>(&self, writer: W) -> std::io::Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["time [s]", "exact", "euler", "leapfrog"])?;

        let rows = self
            .position_exact
            .iter()
            .zip(self.position_euler.iter())
            .zip(self.position_leapfrog.iter());
        for ((exact, euler), leapfrog) in rows {
            wtr.write_record([
                exact.x.to_string(),
                exact.y.to_string(),
                euler.y.to_string(),
                leapfrog.y.to_string(),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// Save the recorded position series to a CSV file
    pub fn save_csv(&self, filename: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(filename)?;
        self.write_csv(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalError;
    use approx::assert_relative_eq;

    fn quiet_params() -> OscillatorParameters {
        OscillatorParameters {
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

    #[test]
    fn test_builder_rejects_zero_window() {
        let err = Simulation::builder(quiet_params())
            .window(0)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroWindow);
    }

    #[test]
    fn test_builder_rejects_zero_stride() {
        let err = Simulation::builder(quiet_params())
            .stride(0)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroStride);
    }

    #[test]
    fn test_step_advances_time() {
        let mut sim = Simulation::new(quiet_params()).unwrap();

        let tick = sim.step().unwrap();
        assert_relative_eq!(tick.time, 0.01, epsilon = 1e-12);
        assert_eq!(sim.step_count(), 1);
        assert_eq!(sim.state(Method::Euler).step_count, 1);
    }

    #[test]
    fn test_decimation_stride() {
        let mut sim = Simulation::builder(quiet_params())
            .stride(10)
            .build()
            .unwrap();

        for _ in 0..95 {
            sim.step().unwrap();
        }

        // Ticks 10, 20, ..., 90 are recorded
        assert_eq!(sim.position_series(Method::Analytic).len(), 9);
        assert_eq!(sim.forcing_h_series().len(), 9);
        assert_eq!(sim.trajectory_series(Method::Leapfrog).len(), 9);
    }

    #[test]
    fn test_series_bounded_by_window() {
        let mut sim = Simulation::builder(quiet_params())
            .window(5)
            .stride(1)
            .build()
            .unwrap();

        for _ in 0..50 {
            sim.step().unwrap();
        }

        assert_eq!(sim.position_series(Method::Analytic).len(), 50);
        assert_eq!(sim.position_series(Method::Analytic).truncated_len(), 5);
    }

    #[test]
    fn test_forces_derived_from_analytic_state() {
        let params = OscillatorParameters {
            w_expr: "2".to_string(),
            h_expr: "1".to_string(),
            ..quiet_params()
        };
        let mut sim = Simulation::new(params).unwrap();

        let tick = sim.step().unwrap();
        assert_relative_eq!(tick.forcing.w, 2.0, epsilon = 1e-12);
        assert_relative_eq!(tick.forcing.h, 1.0, epsilon = 1e-12);
        assert_relative_eq!(
            tick.forcing.f,
            5.0 * (2.0 - tick.analytic.position),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            tick.forcing.g,
            -0.1 * tick.analytic.velocity,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_restart_restores_initial_state() {
        let params = quiet_params();
        let mut sim = Simulation::new(params.clone()).unwrap();
        let fresh = Simulation::new(params.clone()).unwrap();

        for _ in 0..137 {
            sim.step().unwrap();
        }
        sim.restart(params).unwrap();

        for method in [Method::Analytic, Method::Euler, Method::Leapfrog] {
            assert_eq!(sim.state(method), fresh.state(method));
            assert!(sim.position_series(method).is_empty());
            assert!(sim.trajectory_series(method).is_empty());
        }
        assert!(sim.forcing_h_series().is_empty());
        assert!(sim.forcing_w_series().is_empty());
        assert!(sim.spring_force_series().is_empty());
        assert!(sim.damping_force_series().is_empty());
        assert_eq!(sim.time(), 0.0);
    }

    #[test]
    fn test_restart_rejects_invalid_params() {
        let mut sim = Simulation::new(quiet_params()).unwrap();
        sim.step().unwrap();

        let bad = OscillatorParameters {
            mass: -1.0,
            ..quiet_params()
        };
        assert!(sim.restart(bad).is_err());

        // The running simulation is untouched by the failed restart
        assert_eq!(sim.step_count(), 1);
    }

    #[test]
    fn test_eval_failure_halts_tick_atomically() {
        struct Flaky;
        impl ForcingEvaluator for Flaky {
            fn eval(&self, expr: &str, t: f64) -> Result<f64, EvalError> {
                if t == 0.0 {
                    // Construction probe succeeds
                    Ok(0.0)
                } else {
                    Err(EvalError::Evaluator {
                        expr: expr.to_string(),
                        time: t,
                        message: "boom".to_string(),
                    })
                }
            }
        }

        let params = OscillatorParameters {
            w_expr: "mystery(t)".to_string(),
            ..quiet_params()
        };
        let mut sim = Simulation::builder(params)
            .evaluator(Box::new(Flaky))
            .build()
            .unwrap();

        let before = *sim.state(Method::Euler);
        let err = sim.step().unwrap_err();
        assert!(matches!(err, StepError::Evaluation { term: "w", .. }));

        // Nothing advanced
        assert_eq!(sim.time(), 0.0);
        assert_eq!(sim.step_count(), 0);
        assert_eq!(*sim.state(Method::Euler), before);
        assert!(sim.position_series(Method::Analytic).is_empty());
    }

    #[test]
    fn test_csv_export() {
        let mut sim = Simulation::builder(quiet_params())
            .stride(1)
            .build()
            .unwrap();
        for _ in 0..3 {
            sim.step().unwrap();
        }

        let mut out = Vec::new();
        sim.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "time [s],exact,euler,leapfrog");
    }
}
