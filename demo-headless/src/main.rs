use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wave_sim_core::{BackendPreference, FieldSummary, RunConfig, SimError, Stepper};

/// Wave equation simulation with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "wave-sim")]
#[command(about = "2D linear wave equation solver (GPU with CPU fallback)", long_about = None)]
struct Args {
    /// TOML configuration file (flags below override its values)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Grid width in cells
    #[arg(long)]
    width: Option<usize>,

    /// Grid height in cells
    #[arg(long)]
    height: Option<usize>,

    /// Number of time steps
    #[arg(short, long)]
    timesteps: Option<usize>,

    /// Wave propagation speed
    #[arg(long)]
    wave_speed: Option<f32>,

    /// Time step
    #[arg(long)]
    dt: Option<f32>,

    /// Cell spacing
    #[arg(long)]
    dx: Option<f32>,

    /// Executor (auto, gpu, cpu)
    #[arg(short, long)]
    backend: Option<BackendPreference>,

    /// External WGSL update kernel
    #[arg(short, long)]
    kernel: Option<PathBuf>,

    /// Log progress every N steps (0 disables)
    #[arg(short, long)]
    report_interval: Option<usize>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Args {
    /// Start from the config file (or defaults) and apply flag overrides
    fn into_config(self) -> Result<RunConfig, SimError> {
        let mut config = match &self.config {
            Some(path) => RunConfig::read(path)?,
            None => RunConfig::default(),
        };

        let params = &mut config.params;
        params.width = self.width.unwrap_or(params.width);
        params.height = self.height.unwrap_or(params.height);
        params.timesteps = self.timesteps.unwrap_or(params.timesteps);
        params.wave_speed = self.wave_speed.unwrap_or(params.wave_speed);
        params.dt = self.dt.unwrap_or(params.dt);
        params.dx = self.dx.unwrap_or(params.dx);

        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if self.kernel.is_some() {
            config.kernel_path = self.kernel;
        }
        if let Some(interval) = self.report_interval {
            config.report_interval = interval;
        }

        // File values are only checked once merged with the overrides
        config.validate()?;
        Ok(config)
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(config: &RunConfig) -> Result<(), SimError> {
    let params = &config.params;
    println!("=== Wave Simulation ===\n");
    println!(
        "Grid: {}x{}, steps: {}, c={}, dt={}, dx={} (dt_dx2={:.4})",
        params.width,
        params.height,
        params.timesteps,
        params.wave_speed,
        params.dt,
        params.dx,
        params.dt_dx2()
    );

    let mut stepper = Stepper::from_config(config)?;
    let report = stepper.run()?;
    let summary = FieldSummary::from_slice(&stepper.read_current()?);

    println!("Backend: {}", report.backend);
    println!(
        "Elapsed time: {:.3} s ({:.1} steps/s)",
        report.elapsed.as_secs_f64(),
        report.steps_per_second()
    );
    println!("Final field: {summary}");
    info!(
        "Run complete: {} steps on {}, final field {}",
        report.steps, report.backend, summary
    );

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(args.verbose, args.quiet);

    let result = args.into_config().and_then(|config| run(&config));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error [{} {}]: {}", e.category(), e.code(), e);
            ExitCode::from(u8::try_from(e.code()).unwrap_or(1))
        }
    }
}
