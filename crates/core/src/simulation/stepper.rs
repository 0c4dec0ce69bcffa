//! Time-integration loop
//!
//! The `Stepper` owns an executor and the role ring. Each step dispatches the
//! update rule into the `next` slot and then advances the ring, so after `N`
//! steps the `current` role holds step `N` and `previous` holds step `N-1`.

use crate::config::{RunConfig, SimulationParams};
use crate::error::{Result, SimError};
use crate::grid::GridState;
use crate::solver::{create_wave_solver, KernelSource, RoleRing, Roles, WaveSolver};
use std::borrow::Cow;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default progress logging interval in steps
pub const DEFAULT_REPORT_INTERVAL: usize = 500;

/// Lifecycle of a stepper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepperState {
    /// No step executed yet
    Idle,
    /// At least one step executed, more remain
    Stepping,
    /// Every configured step executed; `current` holds the final field
    Done,
}

/// Outcome of `Stepper::run`
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Steps executed by this call
    pub steps: usize,
    /// Wall-clock time of the loop, including the final device sync
    pub elapsed: Duration,
    /// Executor name
    pub backend: String,
    /// Whether the executor ran on a GPU
    pub gpu_accelerated: bool,
}

impl RunReport {
    /// Average throughput of the loop
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Step counts are far below f64 precision
    pub fn steps_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.steps as f64 / secs
        } else {
            0.0
        }
    }
}

/// Drives an executor through the configured number of steps
pub struct Stepper {
    /// Backend-agnostic executor (CPU or GPU)
    solver: Box<dyn WaveSolver>,
    params: SimulationParams,
    dt_dx2: f32,
    ring: RoleRing,
    state: StepperState,
    completed: usize,
    report_interval: usize,
}

impl Stepper {
    /// Wrap an executor whose fields are already uploaded
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidConfig` if `params` fail validation or do not
    /// match the executor's grid.
    pub fn new(solver: Box<dyn WaveSolver>, params: SimulationParams) -> Result<Self> {
        params.validate()?;

        let (width, height) = solver.dimensions();
        if (width, height) != (params.width, params.height) {
            return Err(SimError::invalid(format!(
                "executor grid is {width}x{height}, parameters say {}x{}",
                params.width, params.height
            )));
        }

        Ok(Self {
            solver,
            dt_dx2: params.dt_dx2(),
            params,
            ring: RoleRing::new(),
            state: StepperState::Idle,
            completed: 0,
            report_interval: DEFAULT_REPORT_INTERVAL,
        })
    }

    /// Seed the grid, select the executor and build a stepper from one config
    ///
    /// # Errors
    ///
    /// Any configuration, kernel or device error from setup.
    pub fn from_config(config: &RunConfig) -> Result<Self> {
        config.validate()?;
        Self::from_state(GridState::seeded(&config.params, &config.seed), config)
    }

    /// Build a stepper over caller-supplied initial fields
    ///
    /// The seed section of `config` is ignored; everything else applies.
    ///
    /// # Errors
    ///
    /// Any configuration, kernel or device error from setup, including fields
    /// whose shape disagrees with `config.params`.
    pub fn from_state(state: GridState, config: &RunConfig) -> Result<Self> {
        config.params.validate()?;
        state.check_dimensions(&config.params)?;

        let kernel = KernelSource::from_path(config.kernel_path.as_deref());
        let solver = create_wave_solver(state, config.backend, &kernel)?;

        Ok(Self::new(solver, config.params)?.with_report_interval(config.report_interval))
    }

    /// Log progress every `interval` steps (0 disables)
    #[must_use]
    pub fn with_report_interval(mut self, interval: usize) -> Self {
        self.report_interval = interval;
        self
    }

    /// Execute one step
    ///
    /// # Errors
    ///
    /// - `SimError::AlreadyDone` if every configured step already ran
    /// - `SimError::Dispatch` if the executor rejects the work; the ring is
    ///   not advanced
    pub fn step(&mut self) -> Result<()> {
        if self.state == StepperState::Done {
            return Err(SimError::AlreadyDone(self.completed));
        }

        let roles = self.ring.roles();
        self.solver.dispatch(self.completed, roles, self.dt_dx2)?;
        self.ring.advance();
        self.completed += 1;

        self.state = if self.completed >= self.params.timesteps {
            StepperState::Done
        } else {
            StepperState::Stepping
        };

        // Interval 0 yields None and disables progress logging
        if self.completed.checked_rem(self.report_interval) == Some(0) {
            debug!(
                "Step {}/{} dispatched",
                self.completed, self.params.timesteps
            );
        }

        Ok(())
    }

    /// Step until `Done` and wait for the executor to finish
    ///
    /// # Errors
    ///
    /// - `SimError::AlreadyDone` if called on a finished stepper
    /// - The first error from any step; the run is abandoned
    pub fn run(&mut self) -> Result<RunReport> {
        if self.state == StepperState::Done {
            return Err(SimError::AlreadyDone(self.completed));
        }

        let first = self.completed;
        info!(
            "Running {} steps on {} ({}x{} grid, dt_dx2={:.4})",
            self.params.timesteps - first,
            self.solver.backend_name(),
            self.params.width,
            self.params.height,
            self.dt_dx2
        );

        let start = Instant::now();
        while self.state != StepperState::Done {
            self.step()?;
        }
        self.solver.synchronize()?;
        let elapsed = start.elapsed();

        let report = RunReport {
            steps: self.completed - first,
            elapsed,
            backend: self.solver.backend_name().to_string(),
            gpu_accelerated: self.solver.is_gpu_accelerated(),
        };
        info!(
            "Completed {} steps in {:.3}s ({:.1} steps/s)",
            report.steps,
            elapsed.as_secs_f64(),
            report.steps_per_second()
        );

        Ok(report)
    }

    /// Read back the field in the `current` role
    ///
    /// # Errors
    ///
    /// Returns `SimError::Readback` if the transfer fails.
    pub fn read_current(&self) -> Result<Cow<'_, [f32]>> {
        self.solver.read_slot(self.ring.roles().current)
    }

    /// Read back the field in the `previous` role
    ///
    /// # Errors
    ///
    /// Returns `SimError::Readback` if the transfer fails.
    pub fn read_previous(&self) -> Result<Cow<'_, [f32]>> {
        self.solver.read_slot(self.ring.roles().previous)
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> StepperState {
        self.state
    }

    /// Number of steps executed so far
    #[must_use]
    pub fn steps_completed(&self) -> usize {
        self.completed
    }

    /// Run parameters
    #[must_use]
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Slot assignment the next step will use
    #[must_use]
    pub fn roles(&self) -> Roles {
        self.ring.roles()
    }

    /// Executor name
    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.solver.backend_name()
    }
}
