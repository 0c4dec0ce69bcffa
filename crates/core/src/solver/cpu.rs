//! CPU-based wave solver implementation
//!
//! This module provides a CPU implementation of the `WaveSolver` trait using
//! `Vec<f32>` fields and Rayon for parallelism. This backend is always
//! available and serves as a fallback when GPU acceleration is not available.

use super::rotation::{split_roles, Roles};
use super::update_rule::{step_wave_cpu, StencilInputs};
use super::WaveSolver;
use crate::error::{Result, SimError};
use crate::grid::{GridState, ScalarField};
use std::borrow::Cow;

/// CPU-based wave solver using Rayon for parallelism
pub struct CpuWaveSolver {
    // Wave-height slots; slot 0 starts as current, 1 as previous, 2 as next
    slots: [ScalarField; 3],
    elevation: ScalarField,
    width: usize,
    height: usize,
}

impl CpuWaveSolver {
    /// Take ownership of the initial fields
    #[must_use]
    pub fn new(state: GridState) -> Self {
        let (width, height) = state.dimensions();
        let GridState {
            elevation,
            current,
            previous,
            next,
        } = state;

        Self {
            slots: [current, previous, next],
            elevation,
            width,
            height,
        }
    }
}

impl WaveSolver for CpuWaveSolver {
    fn dispatch(&mut self, _step: usize, roles: Roles, dt_dx2: f32) -> Result<()> {
        let (current, previous, next) = split_roles(&mut self.slots, roles);
        let inputs = StencilInputs {
            current: current.as_slice(),
            previous: previous.as_slice(),
            elevation: self.elevation.as_slice(),
            width: self.width,
            height: self.height,
            dt_dx2,
        };
        // par_chunks_mut joins before returning, which is the step barrier
        step_wave_cpu(&inputs, next.as_mut_slice());
        Ok(())
    }

    fn synchronize(&self) -> Result<()> {
        Ok(())
    }

    fn read_slot(&self, slot: usize) -> Result<Cow<'_, [f32]>> {
        self.slots
            .get(slot)
            .map(|field| Cow::Borrowed(field.as_slice()))
            .ok_or_else(|| SimError::Readback(format!("no buffer slot {slot}")))
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn backend_name(&self) -> &str {
        "CPU (rayon)"
    }

    fn is_gpu_accelerated(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SeedConfig, SimulationParams};
    use crate::solver::rotation::RoleRing;

    fn small_state() -> GridState {
        let params = SimulationParams {
            width: 9,
            height: 7,
            ..SimulationParams::default()
        };
        GridState::seeded(&params, &SeedConfig::open_water())
    }

    #[test]
    fn test_cpu_solver_creation() {
        let solver = CpuWaveSolver::new(small_state());
        assert_eq!(solver.dimensions(), (9, 7));
        assert!(!solver.is_gpu_accelerated());
    }

    #[test]
    fn test_initial_slots_follow_ring() {
        let state = small_state();
        let expected_current = state.current.data.clone();
        let solver = CpuWaveSolver::new(state);
        let roles = RoleRing::new().roles();

        assert_eq!(solver.read_slot(roles.current).unwrap(), expected_current);
        assert_eq!(solver.read_slot(roles.previous).unwrap(), expected_current);
        assert!(solver.read_slot(roles.next).unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_dispatch_writes_only_next() {
        let mut solver = CpuWaveSolver::new(small_state());
        let roles = RoleRing::new().roles();
        let current_before = solver.read_slot(roles.current).unwrap().into_owned();
        let previous_before = solver.read_slot(roles.previous).unwrap().into_owned();

        solver.dispatch(0, roles, 0.25).unwrap();

        assert_eq!(solver.read_slot(roles.current).unwrap(), current_before);
        assert_eq!(solver.read_slot(roles.previous).unwrap(), previous_before);
        let next = solver.read_slot(roles.next).unwrap();
        assert!(next.iter().any(|&v| v != 0.0));
    }

    #[test]
    fn test_read_invalid_slot() {
        let solver = CpuWaveSolver::new(small_state());
        assert!(matches!(solver.read_slot(3), Err(SimError::Readback(_))));
    }
}
