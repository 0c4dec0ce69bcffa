//! Per-cell wave update rule
//!
//! Explicit second-order central-difference discretization of
//! ```text
//! ∂²u/∂t² = c²∇²u
//! ```
//! on a uniform grid, giving the five-point update
//! ```text
//! u[t+1] = 2·u[t] − u[t-1] + (c·dt/dx)² · (u_n + u_s + u_w + u_e − 4·u[t])
//! ```
//!
//! Cell classes, checked in order:
//! 1. Outside the grid: no value (the dispatch never produces these, but the
//!    rule stays safe for padded index spaces)
//! 2. Land (`elevation > 0`): height frozen, `next = current`
//! 3. Water on the outer edge: absorbed, `next = 0`
//! 4. Interior water: five-point stencil
//!
//! The WGSL kernel in `shaders/wave_update.wgsl` implements the same rule and
//! must stay in step with this file.

use rayon::prelude::*;

/// Read-only inputs to one time step
///
/// `next` is not among the inputs: a step reads only these slices and writes
/// only its output slice, so no cell observes a half-updated neighbour.
#[derive(Debug, Clone, Copy)]
pub struct StencilInputs<'a> {
    /// Wave height at `t`
    pub current: &'a [f32],
    /// Wave height at `t-1`
    pub previous: &'a [f32],
    /// Elevation map
    pub elevation: &'a [f32],
    /// Grid width in cells
    pub width: usize,
    /// Grid height in cells
    pub height: usize,
    /// `(c·dt/dx)²`
    pub dt_dx2: f32,
}

impl StencilInputs<'_> {
    /// Next wave height at `(row, col)`, or `None` outside the grid
    #[inline]
    #[must_use]
    pub fn next_height(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.height || col >= self.width {
            return None;
        }

        let w = self.width;
        let idx = row * w + col;
        let c = self.current[idx];

        if self.elevation[idx] > 0.0 {
            return Some(c);
        }

        if row == 0 || row == self.height - 1 || col == 0 || col == w - 1 {
            return Some(0.0);
        }

        let laplacian = self.current[idx - w]
            + self.current[idx + w]
            + self.current[idx - 1]
            + self.current[idx + 1]
            - 4.0 * c;
        Some(2.0 * c - self.previous[idx] + self.dt_dx2 * laplacian)
    }
}

/// Apply the update rule to every cell, writing into `next`
///
/// Rows are processed in parallel; each task owns one output row.
///
/// # Panics
///
/// Panics if `next` is not `width * height` long.
pub fn step_wave_cpu(inputs: &StencilInputs<'_>, next: &mut [f32]) {
    assert_eq!(
        next.len(),
        inputs.width * inputs.height,
        "next field has wrong length"
    );

    next.par_chunks_mut(inputs.width)
        .enumerate()
        .for_each(|(row, out_row)| {
            for (col, out) in out_row.iter_mut().enumerate() {
                if let Some(value) = inputs.next_height(row, col) {
                    *out = value;
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: usize = 5;
    const H: usize = 5;

    fn water() -> Vec<f32> {
        vec![-100.0; W * H]
    }

    #[test]
    fn test_interior_matches_formula() {
        let current: Vec<f32> = (0..W * H).map(|i| i as f32 * 0.5).collect();
        let previous: Vec<f32> = (0..W * H).map(|i| (i % 3) as f32).collect();
        let elevation = water();
        let inputs = StencilInputs {
            current: &current,
            previous: &previous,
            elevation: &elevation,
            width: W,
            height: H,
            dt_dx2: 0.3,
        };

        for row in 1..H - 1 {
            for col in 1..W - 1 {
                let idx = row * W + col;
                let expected = 2.0 * current[idx] - previous[idx]
                    + 0.3
                        * (current[idx - W] + current[idx + W] + current[idx - 1]
                            + current[idx + 1]
                            - 4.0 * current[idx]);
                assert_eq!(inputs.next_height(row, col), Some(expected));
            }
        }
    }

    #[test]
    fn test_out_of_bounds_is_noop() {
        let current = vec![1.0; W * H];
        let elevation = water();
        let inputs = StencilInputs {
            current: &current,
            previous: &current,
            elevation: &elevation,
            width: W,
            height: H,
            dt_dx2: 0.25,
        };
        assert_eq!(inputs.next_height(H, 0), None);
        assert_eq!(inputs.next_height(0, W), None);
        assert_eq!(inputs.next_height(usize::MAX, usize::MAX), None);
    }

    #[test]
    fn test_edges_absorb() {
        let current = vec![7.0; W * H];
        let previous = vec![3.0; W * H];
        let elevation = water();
        let inputs = StencilInputs {
            current: &current,
            previous: &previous,
            elevation: &elevation,
            width: W,
            height: H,
            dt_dx2: 0.5,
        };
        for i in 0..W {
            assert_eq!(inputs.next_height(0, i), Some(0.0));
            assert_eq!(inputs.next_height(H - 1, i), Some(0.0));
            assert_eq!(inputs.next_height(i, 0), Some(0.0));
            assert_eq!(inputs.next_height(i, W - 1), Some(0.0));
        }
    }

    #[test]
    fn test_land_takes_precedence_over_edge() {
        let current: Vec<f32> = (0..W * H).map(|i| i as f32).collect();
        let previous = vec![0.0; W * H];
        let mut elevation = water();
        elevation[1] = 1.0; // land on the top edge
        elevation[2 * W + 2] = 0.5; // interior land
        let inputs = StencilInputs {
            current: &current,
            previous: &previous,
            elevation: &elevation,
            width: W,
            height: H,
            dt_dx2: 0.25,
        };
        assert_eq!(inputs.next_height(0, 1), Some(1.0));
        assert_eq!(inputs.next_height(0, 2), Some(0.0));
        assert_eq!(inputs.next_height(2, 2), Some(12.0));
    }

    #[test]
    fn test_zero_elevation_is_water() {
        let current = vec![4.0; W * H];
        let previous = vec![4.0; W * H];
        let elevation = vec![0.0; W * H];
        let inputs = StencilInputs {
            current: &current,
            previous: &previous,
            elevation: &elevation,
            width: W,
            height: H,
            dt_dx2: 0.25,
        };
        // Flat field: 2·4 − 4 + 0 = 4
        assert_eq!(inputs.next_height(2, 2), Some(4.0));
        assert_eq!(inputs.next_height(0, 2), Some(0.0));
    }

    #[test]
    fn test_step_wave_cpu_single_pulse() {
        let mut current = vec![0.0; W * H];
        current[2 * W + 2] = 10.0;
        let previous = current.clone();
        let elevation = water();
        let mut next = vec![f32::NAN; W * H];

        step_wave_cpu(
            &StencilInputs {
                current: &current,
                previous: &previous,
                elevation: &elevation,
                width: W,
                height: H,
                dt_dx2: 0.25,
            },
            &mut next,
        );

        assert_eq!(next[W + 2], 2.5);
        assert_eq!(next[3 * W + 2], 2.5);
        assert_eq!(next[2 * W + 1], 2.5);
        assert_eq!(next[2 * W + 3], 2.5);
        // 2·10 − 10 + 0.25·(0 + 0 + 0 + 0 − 40)
        assert_eq!(next[2 * W + 2], 0.0);
        assert_eq!(next[W + 1], 0.0);
        assert!(next.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_step_wave_cpu_non_square() {
        let width = 7;
        let height = 4;
        let current = vec![1.0; width * height];
        let elevation = vec![-1.0; width * height];
        let mut next = vec![9.0; width * height];

        step_wave_cpu(
            &StencilInputs {
                current: &current,
                previous: &current,
                elevation: &elevation,
                width,
                height,
                dt_dx2: 0.1,
            },
            &mut next,
        );

        for row in 0..height {
            for col in 0..width {
                let edge = row == 0 || row == height - 1 || col == 0 || col == width - 1;
                let expected = if edge { 0.0 } else { 1.0 };
                assert_eq!(next[row * width + col], expected, "cell ({row}, {col})");
            }
        }
    }

    #[test]
    #[should_panic(expected = "next field has wrong length")]
    fn test_step_wave_cpu_length_check() {
        let field = vec![0.0; W * H];
        let mut next = vec![0.0; 3];
        step_wave_cpu(
            &StencilInputs {
                current: &field,
                previous: &field,
                elevation: &field,
                width: W,
                height: H,
                dt_dx2: 0.25,
            },
            &mut next,
        );
    }
}
