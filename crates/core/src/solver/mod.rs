//! Wave solver module
//!
//! This module provides a unified GPU/CPU abstraction layer for the per-cell
//! wave update. The core abstraction is the `WaveSolver` trait, which has
//! both CPU and GPU implementations; both evaluate the same rule from
//! `update_rule`.
//!
//! # Feature Flags
//!
//! - `gpu` (default): Enables GPU acceleration via wgpu. Disable with `--no-default-features`
//!   for environments without GPU access.
//!
//! # Backend Selection
//!
//! `BackendPreference::Auto` selects the best available backend:
//! 1. Try GPU (if `gpu` feature enabled and hardware available)
//! 2. Fall back to CPU (always available)
//!
//! `Gpu` makes a missing or unusable device fatal; `Cpu` never touches the GPU.
//!
//! # Example
//!
//! ```rust,ignore
//! use wave_sim_core::config::{BackendPreference, SeedConfig, SimulationParams};
//! use wave_sim_core::grid::GridState;
//! use wave_sim_core::solver::{create_wave_solver, KernelSource};
//!
//! let params = SimulationParams::default();
//! let state = GridState::seeded(&params, &SeedConfig::default());
//! let solver = create_wave_solver(state, BackendPreference::Auto, &KernelSource::Builtin)?;
//! ```

mod context;
mod cpu;
mod kernel;
mod rotation;
#[allow(clippy::module_name_repetitions)]
mod r#trait;
pub mod update_rule;

#[cfg(feature = "gpu")]
mod gpu;

// Re-exports
pub use context::GpuInitResult;
pub use cpu::CpuWaveSolver;
pub use kernel::{KernelSource, BUILTIN_KERNEL, KERNEL_ENTRY_POINT, WORKGROUP_SIZE};
pub use r#trait::WaveSolver;
pub use rotation::{split_roles, RoleRing, Roles};
pub use update_rule::{step_wave_cpu, StencilInputs};

#[cfg(feature = "gpu")]
pub use context::GpuContext;
#[cfg(feature = "gpu")]
pub use gpu::GpuWaveSolver;

use crate::config::BackendPreference;
use crate::error::{Result, SimError};
use crate::grid::GridState;
use tracing::{info, warn};

/// Create a wave solver for `state` on the preferred backend
///
/// The kernel is only read when a GPU is attempted. With `Auto`, a missing
/// device or a grid the device cannot hold falls back to the CPU; a kernel
/// that fails to load or build is always an error.
///
/// # Arguments
///
/// * `state` - Initial fields (consumed)
/// * `preference` - Requested backend
/// * `kernel` - WGSL source for the GPU backend
///
/// # Errors
///
/// - `SimError::GpuUnavailable` if `Gpu` is requested without the `gpu` feature
/// - `SimError::NoDevice` / `SimError::DeviceInit` / `SimError::Allocation`
///   if `Gpu` is requested and the device cannot be used
/// - `SimError::KernelSource` / `SimError::KernelBuild` for a bad kernel
pub fn create_wave_solver(
    state: GridState,
    preference: BackendPreference,
    kernel: &KernelSource,
) -> Result<Box<dyn WaveSolver>> {
    let (width, height) = state.dimensions();

    if preference == BackendPreference::Cpu {
        if let KernelSource::File(path) = kernel {
            warn!(
                "Kernel file {} ignored on the CPU backend",
                path.display()
            );
        }
        info!("Using CPU backend ({}x{} grid)", width, height);
        return Ok(Box::new(CpuWaveSolver::new(state)));
    }

    #[cfg(feature = "gpu")]
    {
        let source = kernel.load()?;
        let required = preference == BackendPreference::Gpu;

        match GpuContext::new() {
            GpuInitResult::Success(gpu_context) => {
                info!(
                    "Using GPU backend: {} ({}x{} grid, {} kernel)",
                    gpu_context.adapter_name(),
                    width,
                    height,
                    kernel.describe()
                );
                match GpuWaveSolver::new(gpu_context, &state, &source) {
                    Ok(solver) => return Ok(Box::new(solver)),
                    Err(e @ SimError::Allocation { .. }) if !required => {
                        warn!("{}, falling back to CPU", e);
                    }
                    Err(e) => return Err(e),
                }
            }
            GpuInitResult::NoGpuFound => {
                if required {
                    return Err(SimError::NoDevice);
                }
                info!("No GPU found, using CPU backend");
            }
            GpuInitResult::InitFailed {
                adapter_name,
                error,
            } => {
                if required {
                    return Err(SimError::DeviceInit {
                        adapter_name,
                        message: error,
                    });
                }
                warn!(
                    "GPU '{}' found but failed to initialize: {}. Falling back to CPU.",
                    adapter_name, error
                );
            }
        }
    }

    #[cfg(not(feature = "gpu"))]
    {
        if preference == BackendPreference::Gpu {
            return Err(SimError::GpuUnavailable);
        }
        info!("GPU feature disabled, using CPU backend");
    }

    Ok(Box::new(CpuWaveSolver::new(state)))
}
