mod cli;

use bevy::app::App;
use bevy::log::{Level, LogPlugin, error, info};
use clap::Parser;
use cli::{Args, CliError};
use lorenz_ensemble::ensemble::integrate_ensemble;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    if args.list_integrators {
        cli::handle_list_integrators();
        return ExitCode::SUCCESS;
    }

    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Install the global log subscriber through a headless app
fn init_logging(verbose: bool) {
    let mut app = App::new();
    app.add_plugins(LogPlugin {
        level: if verbose { Level::DEBUG } else { Level::INFO },
        ..Default::default()
    });
}

fn run(args: &Args) -> Result<(), CliError> {
    let config = cli::load_and_apply_config(args)?;

    if args.print_config {
        info!(
            "=== Current Configuration (TOML) ===\n{}",
            cli::config_as_toml(&config)?
        );
        info!("=== End Configuration ===");
    }

    let (grid, ensemble) =
        integrate_ensemble(&config.ensemble, &config.parameters, &config.solver)?;

    print!("{}", cli::render_summary(&grid, &ensemble, args.bins));

    Ok(())
}
