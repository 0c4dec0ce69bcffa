//! Host-side grid state
//!
//! Holds the four fields a run starts from: the immutable elevation map, the
//! two wave-height snapshots the stencil needs (`t` and `t-1`) and a zeroed
//! scratch field for `t+1`. The state is built once on the host and then
//! handed to an executor, which uploads it and owns the buffers from there on.

use super::ScalarField;
use crate::config::{SeedConfig, SimulationParams};
use crate::error::{Result, SimError};
use tracing::debug;

/// Initial fields of a run
#[derive(Debug, Clone, PartialEq)]
pub struct GridState {
    /// Elevation map; `> 0` is land, `<= 0` is water
    pub elevation: ScalarField,
    /// Wave height at `t`
    pub current: ScalarField,
    /// Wave height at `t-1`
    pub previous: ScalarField,
    /// Scratch for `t+1`
    pub next: ScalarField,
}

impl GridState {
    /// Seed the grid from a source circle and an optional land circle
    ///
    /// - `elevation` is `water_elevation` everywhere except inside the land
    ///   circle, where it is `land_elevation`
    /// - `current` and `previous` are `source_height` inside the source
    ///   circle and zero elsewhere
    /// - `next` is zero
    #[must_use]
    pub fn seeded(params: &SimulationParams, seed: &SeedConfig) -> Self {
        let (width, height) = (params.width, params.height);
        let source = seed.source_circle(params);

        let mut elevation = ScalarField::with_value(width, height, seed.water_elevation);
        let mut current = ScalarField::new(width, height);

        let mut source_cells = 0_usize;
        let mut land_cells = 0_usize;
        for row in 0..height {
            for col in 0..width {
                let idx = row * width + col;
                if source.contains(row, col) {
                    current.data[idx] = seed.source_height;
                    source_cells += 1;
                }
                if seed.land.is_some_and(|land| land.contains(row, col)) {
                    elevation.data[idx] = seed.land_elevation;
                    land_cells += 1;
                }
            }
        }

        debug!(
            "Seeded {}x{} grid: {} source cells, {} land cells",
            width, height, source_cells, land_cells
        );

        Self {
            elevation,
            previous: current.clone(),
            current,
            next: ScalarField::new(width, height),
        }
    }

    /// Assemble a state from caller-supplied fields
    ///
    /// `next` is created zeroed.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidConfig` if the fields disagree on shape.
    pub fn from_fields(
        elevation: ScalarField,
        current: ScalarField,
        previous: ScalarField,
    ) -> Result<Self> {
        let dims = elevation.dimensions();
        for (name, field) in [("current", &current), ("previous", &previous)] {
            if field.dimensions() != dims {
                return Err(SimError::invalid(format!(
                    "{name} field is {:?} but elevation is {:?}",
                    field.dimensions(),
                    dims
                )));
            }
        }
        let (width, height) = dims;
        Ok(Self {
            elevation,
            current,
            previous,
            next: ScalarField::new(width, height),
        })
    }

    /// `(width, height)` shared by every field
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        self.elevation.dimensions()
    }

    /// Check the state against run parameters
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidConfig` on a dimension mismatch.
    pub fn check_dimensions(&self, params: &SimulationParams) -> Result<()> {
        let expected = (params.width, params.height);
        for (name, field) in [
            ("elevation", &self.elevation),
            ("current", &self.current),
            ("previous", &self.previous),
            ("next", &self.next),
        ] {
            if field.dimensions() != expected {
                return Err(SimError::invalid(format!(
                    "{name} field is {:?}, expected {:?}",
                    field.dimensions(),
                    expected
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Circle;

    fn params(width: usize, height: usize) -> SimulationParams {
        SimulationParams {
            width,
            height,
            ..SimulationParams::default()
        }
    }

    #[test]
    fn test_default_seed_layout() {
        let params = SimulationParams::default();
        let state = GridState::seeded(&params, &SeedConfig::default());

        // Source at the centre, r² = 4
        assert_eq!(state.current.get(256, 256), 10.0);
        assert_eq!(state.current.get(254, 256), 10.0);
        assert_eq!(state.current.get(255, 255), 10.0);
        assert_eq!(state.current.get(254, 255), 0.0);
        assert_eq!(state.current, state.previous);
        assert_eq!(state.current.data.iter().filter(|&&v| v == 10.0).count(), 13);

        // Island at (400, 400), r = 50
        assert_eq!(state.elevation.get(400, 400), 100.0);
        assert_eq!(state.elevation.get(350, 400), 100.0);
        assert_eq!(state.elevation.get(349, 400), -100.0);
        assert_eq!(state.elevation.get(0, 0), -100.0);

        assert!(state.next.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_open_water_has_no_land() {
        let state = GridState::seeded(&params(16, 16), &SeedConfig::open_water());
        assert!(state.elevation.data.iter().all(|&e| e <= 0.0));
    }

    #[test]
    fn test_circles_clipped_to_grid() {
        let seed = SeedConfig {
            source: Some(Circle::new(0, 0, 1)),
            land: Some(Circle::new(9, 9, 100)),
            ..SeedConfig::default()
        };
        let state = GridState::seeded(&params(10, 10), &seed);

        assert_eq!(state.current.data.iter().filter(|&&v| v > 0.0).count(), 3);
        assert!(state.elevation.data.iter().all(|&e| e == 100.0));
    }

    #[test]
    fn test_from_fields_rejects_mismatch() {
        let result = GridState::from_fields(
            ScalarField::new(4, 4),
            ScalarField::new(4, 4),
            ScalarField::new(4, 5),
        );
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_check_dimensions() {
        let state = GridState::seeded(&params(8, 6), &SeedConfig::open_water());
        assert!(state.check_dimensions(&params(8, 6)).is_ok());
        assert!(state.check_dimensions(&params(6, 8)).is_err());
    }
}
