//! Run configuration
//!
//! All values are fixed for the lifetime of a run. Defaults reproduce the
//! reference scenario: a 512×512 basin, a small raised source in the middle
//! and a circular island near the lower-right corner. Configurations can be
//! loaded from TOML; any omitted key keeps its default.

use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Grid dimensions, step count and physical constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Grid width in cells (columns)
    pub width: usize,
    /// Grid height in cells (rows)
    pub height: usize,
    /// Number of time steps to integrate
    pub timesteps: usize,
    /// Wave propagation speed `c`
    pub wave_speed: f32,
    /// Time step `dt`
    pub dt: f32,
    /// Cell spacing `dx`
    pub dx: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            timesteps: 2500,
            wave_speed: 1.0,
            dt: 0.1,
            dx: 1.0,
        }
    }
}

impl SimulationParams {
    /// Largest stable `dt_dx2` for the 2D five-point stencil (CFL bound)
    pub const MAX_STABLE_DT_DX2: f32 = 0.5;

    /// Stability coefficient `(c·dt/dx)²`
    #[must_use]
    pub fn dt_dx2(&self) -> f32 {
        (self.wave_speed * self.wave_speed * self.dt * self.dt) / (self.dx * self.dx)
    }

    /// Whether `dt_dx2` lies within the CFL bound (inclusive)
    #[must_use]
    pub fn is_stable(dt_dx2: f32) -> bool {
        dt_dx2 <= Self::MAX_STABLE_DT_DX2
    }

    /// Total number of cells
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Check dimensions, physical constants and the CFL bound
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidConfig` naming the first offending value.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SimError::invalid(format!(
                "grid dimensions must be positive (width={}, height={})",
                self.width, self.height
            )));
        }
        if self.width > u32::MAX as usize || self.height > u32::MAX as usize {
            return Err(SimError::invalid(format!(
                "grid dimensions exceed u32 range (width={}, height={})",
                self.width, self.height
            )));
        }
        if self.timesteps == 0 {
            return Err(SimError::invalid("timesteps must be positive"));
        }
        for (name, value) in [
            ("wave_speed", self.wave_speed),
            ("dt", self.dt),
            ("dx", self.dx),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimError::invalid(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        let dt_dx2 = self.dt_dx2();
        if !Self::is_stable(dt_dx2) {
            return Err(SimError::invalid(format!(
                "dt_dx2 = {dt_dx2} violates the CFL bound of {}",
                Self::MAX_STABLE_DT_DX2
            )));
        }
        Ok(())
    }
}

/// Circle in grid coordinates, inclusive of its rim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circle {
    /// Row of the centre (may lie outside the grid)
    pub center_row: i64,
    /// Column of the centre (may lie outside the grid)
    pub center_col: i64,
    /// Radius in cells
    pub radius: u32,
}

impl Circle {
    /// Create a circle
    #[must_use]
    pub const fn new(center_row: i64, center_col: i64, radius: u32) -> Self {
        Self {
            center_row,
            center_col,
            radius,
        }
    }

    /// `(row - cy)² + (col - cx)² <= r²`
    ///
    /// Evaluated in 128-bit: any `i64` centre and `u32` radius compares
    /// without overflow for rows and columns within the `u32` grid range.
    #[must_use]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        let dy = (row as i128 - i128::from(self.center_row)).unsigned_abs();
        let dx = (col as i128 - i128::from(self.center_col)).unsigned_abs();
        let r = u128::from(self.radius);
        dy * dy + dx * dx <= r * r
    }
}

/// Initial condition: where the wave starts and where land sits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Source region. `None` centres a radius-2 source on the grid.
    pub source: Option<Circle>,
    /// Land region. `None` means open water everywhere.
    pub land: Option<Circle>,
    /// Initial wave height inside the source
    pub source_height: f32,
    /// Elevation assigned to land cells (must be > 0)
    pub land_elevation: f32,
    /// Elevation assigned to water cells (must be <= 0)
    pub water_elevation: f32,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            source: None,
            land: Some(Circle::new(400, 400, 50)),
            source_height: 10.0,
            land_elevation: 100.0,
            water_elevation: -100.0,
        }
    }
}

impl SeedConfig {
    /// Radius of the source when none is configured
    pub const DEFAULT_SOURCE_RADIUS: u32 = 2;

    /// Open water with only a centred source
    #[must_use]
    pub fn open_water() -> Self {
        Self {
            land: None,
            ..Self::default()
        }
    }

    /// Source circle resolved against the grid dimensions
    #[must_use]
    pub fn source_circle(&self, params: &SimulationParams) -> Circle {
        self.source.unwrap_or(Circle::new(
            (params.height / 2) as i64,
            (params.width / 2) as i64,
            Self::DEFAULT_SOURCE_RADIUS,
        ))
    }

    /// Check that land and water elevations classify correctly
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidConfig` if land would read as water or vice versa.
    pub fn validate(&self) -> Result<()> {
        if !self.source_height.is_finite() {
            return Err(SimError::invalid("source_height must be finite"));
        }
        if self.land_elevation.is_nan() || self.land_elevation <= 0.0 {
            return Err(SimError::invalid(format!(
                "land_elevation must be positive, got {}",
                self.land_elevation
            )));
        }
        if self.water_elevation.is_nan() || self.water_elevation > 0.0 {
            return Err(SimError::invalid(format!(
                "water_elevation must not be positive, got {}",
                self.water_elevation
            )));
        }
        Ok(())
    }
}

/// Which executor runs the per-cell update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// Try the GPU, fall back to the CPU when it is unavailable
    #[default]
    Auto,
    /// CPU only (rayon)
    Cpu,
    /// GPU only; failing to initialize it aborts the run
    Gpu,
}

impl FromStr for BackendPreference {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            "gpu" => Ok(Self::Gpu),
            other => Err(format!("unknown backend '{other}' (expected auto, cpu or gpu)")),
        }
    }
}

/// Complete configuration of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Grid and physics
    pub params: SimulationParams,
    /// Initial condition
    pub seed: SeedConfig,
    /// Executor selection
    pub backend: BackendPreference,
    /// External WGSL kernel replacing the built-in one
    pub kernel_path: Option<PathBuf>,
    /// Log progress every N steps (0 disables)
    pub report_interval: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            params: SimulationParams::default(),
            seed: SeedConfig::default(),
            backend: BackendPreference::Auto,
            kernel_path: None,
            report_interval: crate::simulation::DEFAULT_REPORT_INTERVAL,
        }
    }
}

impl RunConfig {
    /// Parse a TOML document; omitted keys keep their defaults
    ///
    /// # Errors
    ///
    /// Returns `SimError::ConfigFile` on syntax errors and
    /// `SimError::InvalidConfig` if the parsed values fail validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::parse(content, Path::new("<inline>"))
    }

    /// Load and validate a TOML configuration file
    ///
    /// # Errors
    ///
    /// Returns `SimError::ConfigFile` if the file cannot be read or parsed and
    /// `SimError::InvalidConfig` if the values fail validation.
    pub fn load(path: &Path) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML configuration file without validating it
    ///
    /// For callers that apply overrides first and validate the merged result.
    ///
    /// # Errors
    ///
    /// Returns `SimError::ConfigFile` if the file cannot be read or parsed.
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SimError::ConfigFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::deserialize(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        let config = Self::deserialize(content, path)?;
        config.validate()?;
        Ok(config)
    }

    fn deserialize(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| SimError::ConfigFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Validate params and seed together
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;
        self.seed.validate()
    }
}
