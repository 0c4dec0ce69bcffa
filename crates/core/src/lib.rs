//! Wave Simulation Core Library
//!
//! Integrates the linear 2D wave equation on a regular grid with an explicit
//! five-point finite-difference stencil. Cells with positive elevation are
//! land and hold their wave height; the outer edge absorbs.
//!
//! ## Pipeline
//!
//! - `config`: run parameters, seeding geometry and backend choice (TOML-loadable)
//! - `grid`: host-side fields and the seeded initial state
//! - `solver`: the update rule and its CPU (rayon) and GPU (wgpu) executors
//! - `simulation`: the stepper that rotates buffer roles through time
//!
//! ```rust,ignore
//! use wave_sim_core::{RunConfig, Stepper, FieldSummary};
//!
//! let mut stepper = Stepper::from_config(&RunConfig::default())?;
//! let report = stepper.run()?;
//! let summary = FieldSummary::from_slice(&stepper.read_current()?);
//! ```

pub mod config;
pub mod error;
pub mod grid;
pub mod simulation;
pub mod solver;

// Re-export the types a runner needs
pub use config::{BackendPreference, Circle, RunConfig, SeedConfig, SimulationParams};
pub use error::{ErrorCategory, Result, SimError};
pub use grid::{GridState, ScalarField};
pub use simulation::{FieldSummary, RunReport, Stepper, StepperState};
pub use solver::{create_wave_solver, KernelSource, WaveSolver};
