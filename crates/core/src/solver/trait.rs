//! Wave solver trait definition
//!
//! This module defines the `WaveSolver` trait, the backend-agnostic device
//! executor. Both CPU and GPU implementations own three wave-height buffers
//! in fixed slots plus the elevation map; the stepper decides which slot plays
//! which role on every call.

use super::rotation::Roles;
use crate::error::Result;
use std::borrow::Cow;

/// Backend-agnostic interface for the per-cell wave update
pub trait WaveSolver: Send + Sync {
    /// Evaluate the update rule over the full `width × height` index space
    ///
    /// Reads the `roles.current` and `roles.previous` slots and the elevation
    /// map, writes only the `roles.next` slot. Returns once the work is
    /// ordered before any later dispatch or readback.
    ///
    /// # Arguments
    ///
    /// * `step` - Zero-based step index (for diagnostics)
    /// * `roles` - Slot assignment for this step
    /// * `dt_dx2` - Stability coefficient `(c·dt/dx)²`
    ///
    /// # Errors
    ///
    /// Returns `SimError::Dispatch` if the backend rejects the work.
    fn dispatch(&mut self, step: usize, roles: Roles, dt_dx2: f32) -> Result<()>;

    /// Block until all submitted work has finished
    ///
    /// # Errors
    ///
    /// Returns `SimError::Dispatch` if waiting on the device fails.
    fn synchronize(&self) -> Result<()>;

    /// Copy the field held in `slot` to the host
    ///
    /// CPU backend returns a borrowed slice, GPU backend an owned `Vec`.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Readback` if the transfer fails.
    fn read_slot(&self, slot: usize) -> Result<Cow<'_, [f32]>>;

    /// Grid dimensions as `(width, height)` in cells
    fn dimensions(&self) -> (usize, usize);

    /// Human-readable backend name for reports
    fn backend_name(&self) -> &str;

    /// Check if this is the GPU backend
    fn is_gpu_accelerated(&self) -> bool;
}
