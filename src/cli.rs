//! Command line interface for lorenz-ensemble

use bevy::log::info;
use clap::Parser;
use lorenz_ensemble::config::LorenzConfig;
use lorenz_ensemble::ensemble::{Histogram, TimeGrid, TrajectoryEnsemble};
use lorenz_ensemble::error::{ConfigurationError, EnsembleError};
use lorenz_ensemble::integrators::registry::IntegratorRegistry;
use lorenz_ensemble::{Scalar, Vector};
use std::fmt;

/// CLI-specific errors
#[derive(Debug)]
pub enum CliError {
    /// Invalid integrator name provided
    InvalidIntegrator(ConfigurationError),
    /// Configuration could not be serialized for display
    ConfigDisplay(String),
    /// The integration run itself failed
    Ensemble(EnsembleError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::InvalidIntegrator(err) => write!(f, "Invalid integrator: {err}"),
            CliError::ConfigDisplay(msg) => write!(f, "Failed to display configuration: {msg}"),
            CliError::Ensemble(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<EnsembleError> for CliError {
    fn from(err: EnsembleError) -> Self {
        CliError::Ensemble(err)
    }
}

/// Integrate an ensemble of Lorenz trajectories and summarize them
#[derive(Parser, Debug)]
#[command(
    version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")"),
    about,
    long_about = None
)]
pub struct Args {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// Number of ensemble members (overrides config file)
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub members: Option<usize>,

    /// Integration horizon (overrides config file)
    #[arg(short = 't', long, value_name = "TIME", allow_negative_numbers = true)]
    pub max_time: Option<Scalar>,

    /// Reported samples per unit time (overrides config file)
    #[arg(long, value_name = "COUNT")]
    pub samples_per_unit_time: Option<u32>,

    /// Lorenz sigma parameter
    #[arg(long, value_name = "VALUE", allow_negative_numbers = true)]
    pub sigma: Option<Scalar>,

    /// Lorenz beta parameter
    #[arg(long, value_name = "VALUE", allow_negative_numbers = true)]
    pub beta: Option<Scalar>,

    /// Lorenz rho parameter
    #[arg(long, value_name = "VALUE", allow_negative_numbers = true)]
    pub rho: Option<Scalar>,

    /// Integrator type (e.g., rk4, rk38, dopri5)
    #[arg(short = 'i', long, value_name = "TYPE")]
    pub integrator: Option<String>,

    /// Solve members one after another instead of on the task pool
    #[arg(long)]
    pub sequential: bool,

    /// Number of histogram bins for the time-averaged x coordinate
    #[arg(long, value_name = "COUNT", default_value = "10")]
    pub bins: usize,

    /// List available integrators and exit
    #[arg(long)]
    pub list_integrators: bool,

    /// Print the effective configuration as TOML before running
    #[arg(long)]
    pub print_config: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Handles the --list-integrators flag by printing available integrators
pub fn handle_list_integrators() {
    let registry = IntegratorRegistry::standard();
    println!("Available integrators:");
    for name in registry.list_available() {
        if let Ok(integrator) = registry.create(&name) {
            println!(
                "  - {name} (order {}{})",
                integrator.convergence_order(),
                if integrator.is_adaptive() { ", adaptive" } else { "" }
            );
        }
    }

    let aliases = registry.list_aliases();
    if !aliases.is_empty() {
        println!("\nAliases:");
        for (alias, target) in aliases {
            println!("  - {alias} -> {target}");
        }
    }
}

/// Loads configuration from file or defaults, then applies command-line overrides
pub fn load_and_apply_config(args: &Args) -> Result<LorenzConfig, CliError> {
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {config_path}");
        LorenzConfig::load_or_default(config_path)
    } else {
        LorenzConfig::load_from_user_config()
    };

    if let Some(members) = args.members {
        info!("Overriding member count to: {members}");
        config.ensemble.member_count = members;
    }

    if let Some(max_time) = args.max_time {
        info!("Overriding max time to: {max_time}");
        config.ensemble.max_time = max_time;
    }

    if let Some(samples) = args.samples_per_unit_time {
        info!("Overriding samples per unit time to: {samples}");
        config.ensemble.samples_per_unit_time = samples;
    }

    if let Some(sigma) = args.sigma {
        config.parameters.sigma = sigma;
    }

    if let Some(beta) = args.beta {
        config.parameters.beta = beta;
    }

    if let Some(rho) = args.rho {
        config.parameters.rho = rho;
    }

    if let Some(integrator_type) = &args.integrator {
        IntegratorRegistry::standard()
            .create(integrator_type)
            .map_err(CliError::InvalidIntegrator)?;

        info!("Using integrator: {integrator_type}");
        config.solver.integrator = integrator_type.clone();
    }

    if args.sequential {
        config.solver.parallel = false;
    }

    Ok(config)
}

pub fn config_as_toml(config: &LorenzConfig) -> Result<String, CliError> {
    toml::to_string_pretty(config).map_err(|e| CliError::ConfigDisplay(e.to_string()))
}

fn format_vector(v: Vector) -> String {
    format!("({:>9.4}, {:>9.4}, {:>9.4})", v.x, v.y, v.z)
}

/// Human-readable per-member table followed by a histogram of mean x
pub fn render_summary(grid: &TimeGrid, ensemble: &TrajectoryEnsemble, bins: usize) -> String {
    let (members, samples, _) = ensemble.shape();
    let mut out = String::new();

    out.push_str(&format!(
        "{members} members, {samples} samples from t = 0 to t = {}\n\n",
        grid.last().copied().unwrap_or_default()
    ));

    if ensemble.is_empty() {
        return out;
    }

    out.push_str(&format!(
        "{:>6}  {:<33}  {:<33}  {:<33}\n",
        "member", "initial", "final", "time average"
    ));

    let averages = ensemble.time_averages();
    for (member, ((initial, last), average)) in ensemble
        .initial_states()
        .into_iter()
        .zip(ensemble.final_states())
        .zip(averages.iter().copied())
        .enumerate()
    {
        out.push_str(&format!(
            "{member:>6}  {}  {}  {}\n",
            format_vector(initial),
            format_vector(last),
            format_vector(average)
        ));
    }

    let mean_x: Vec<Scalar> = averages.iter().map(|average| average.x).collect();
    let histogram = Histogram::from_values(&mean_x, bins);
    if histogram.bin_count() > 0 {
        out.push_str("\nTime-averaged x:\n");
        let last = histogram.bin_count() - 1;
        for (index, (low, high, count)) in histogram.bins().enumerate() {
            // The last bin also holds the maximum
            let close = if index == last { ']' } else { ')' };
            out.push_str(&format!("  [{low:>9.4}, {high:>9.4}{close}  {count}\n"));
        }
    }

    out
}
