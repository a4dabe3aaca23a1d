use crate::ensemble::{EnsembleConfig, SolverConfig};
use crate::physics::lorenz::LorenzParameters;
use crate::physics::math::Scalar;
use bevy::log::{info, warn};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.toml";
const ENV_PREFIX: &str = "LORENZ_ENSEMBLE";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct LorenzConfig {
    pub ensemble: EnsembleConfig,
    pub parameters: LorenzParameters,
    pub solver: SolverConfig,
    pub view: ViewConfig,
}

/// Settings for rendering front ends. The integrator never reads these.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct ViewConfig {
    /// Azimuthal viewing angle in degrees
    pub angle: Scalar,
}

impl LorenzConfig {
    /// Path of `config.toml` in the platform configuration directory
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "lorenz-ensemble")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Layer defaults, the user config file, and `LORENZ_ENSEMBLE_*`
    /// environment variables, falling back to defaults on any error.
    pub fn load_from_user_config() -> Self {
        let path = Self::user_config_path();

        match &path {
            Some(path) if path.exists() => info!("Loading configuration from {}", path.display()),
            Some(path) => info!("Config file {} not found. Using defaults.", path.display()),
            None => info!("No configuration directory available. Using defaults."),
        }

        match Self::load_layered(path.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load configuration: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Build a configuration from defaults, an optional file, and the environment.
    ///
    /// Nested keys are separated by `__` in variable names, so
    /// `LORENZ_ENSEMBLE_SOLVER__INTEGRATOR=dopri5` sets `solver.integrator`.
    pub fn load_layered(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        Self::load_layered_with_prefix(path, ENV_PREFIX)
    }

    fn load_layered_with_prefix(
        path: Option<&Path>,
        env_prefix: &str,
    ) -> Result<Self, config::ConfigError> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            );
        }

        builder
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a file, falling back to defaults if the file doesn't exist
    pub fn load_or_default(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse config file {}: {}. Using defaults.", path, e);
                    Self::default()
                }
            },
            Err(_) => {
                info!("Config file {} not found. Using defaults.", path);
                Self::default()
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "lorenz-ensemble-{}-{}.toml",
            name,
            std::process::id()
        ))
    }

    #[test]
    fn test_defaults() {
        let config = LorenzConfig::default();
        assert_eq!(config.ensemble.member_count, 10);
        assert_eq!(config.ensemble.max_time, 4.0);
        assert_eq!(config.ensemble.samples_per_unit_time, 250);
        assert_eq!(config.parameters.sigma, 10.0);
        assert_eq!(config.parameters.beta, 8.0 / 3.0);
        assert_eq!(config.parameters.rho, 28.0);
        assert_eq!(config.solver.integrator, "rk4");
        assert!(config.solver.parallel);
        assert_eq!(config.view.angle, 0.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: LorenzConfig = toml::from_str(
            r#"
            [ensemble]
            member_count = 3

            [parameters]
            rho = 14.0
            "#,
        )
        .unwrap();

        assert_eq!(config.ensemble.member_count, 3);
        assert_eq!(config.ensemble.max_time, 4.0);
        assert_eq!(config.parameters.rho, 14.0);
        assert_eq!(config.parameters.sigma, 10.0);
        assert_eq!(config.solver, SolverConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = LorenzConfig::default();
        config.solver.integrator = "dopri5".to_string();
        config.view.angle = 45.0;

        let serialized = toml::to_string_pretty(&config).unwrap();
        let restored: LorenzConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_save_and_load_file() {
        let path = scratch_path("save");
        let mut config = LorenzConfig::default();
        config.ensemble.member_count = 42;

        config.save(path.to_str().unwrap()).unwrap();
        let loaded = LorenzConfig::load_or_default(path.to_str().unwrap());
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.ensemble.member_count, 42);
    }

    #[test]
    fn test_load_or_default_with_missing_file() {
        let config = LorenzConfig::load_or_default("/nonexistent/lorenz-ensemble.toml");
        assert_eq!(config, LorenzConfig::default());
    }

    #[test]
    fn test_load_or_default_with_invalid_file() {
        let path = scratch_path("invalid");
        std::fs::write(&path, "ensemble = \"not a table\"").unwrap();
        let config = LorenzConfig::load_or_default(path.to_str().unwrap());
        std::fs::remove_file(&path).ok();

        assert_eq!(config, LorenzConfig::default());
    }

    #[test]
    fn test_load_layered_reads_file() {
        let path = scratch_path("layered");
        std::fs::write(&path, "[solver]\nintegrator = \"rk38\"\nsubsteps_per_sample = 8\n").unwrap();
        let config = LorenzConfig::load_layered(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.solver.integrator, "rk38");
        assert_eq!(config.solver.substeps_per_sample, 8);
        assert_eq!(config.ensemble, EnsembleConfig::default());
    }

    #[test]
    fn test_load_layered_reads_environment() {
        // A prefix of its own keeps other tests' layered loads unaffected
        let prefix = "LORENZ_ENSEMBLE_ENV_TEST";
        let overrides = [
            ("LORENZ_ENSEMBLE_ENV_TEST_SOLVER__INTEGRATOR", "dopri5"),
            ("LORENZ_ENSEMBLE_ENV_TEST_ENSEMBLE__MAX_TIME", "2.5"),
            ("LORENZ_ENSEMBLE_ENV_TEST_ENSEMBLE__MEMBER_COUNT", "3"),
        ];
        let path = scratch_path("environment");
        std::fs::write(&path, "[solver]\nintegrator = \"rk38\"\n").unwrap();

        for (key, value) in overrides {
            // SAFETY: no other test reads or writes variables under this prefix
            unsafe { std::env::set_var(key, value) };
        }
        let config = LorenzConfig::load_layered_with_prefix(Some(&path), prefix);
        for (key, _) in overrides {
            // SAFETY: as above
            unsafe { std::env::remove_var(key) };
        }
        std::fs::remove_file(&path).ok();

        let config = config.unwrap();
        assert_eq!(config.solver.integrator, "dopri5");
        assert_eq!(config.ensemble.max_time, 2.5);
        assert_eq!(config.ensemble.member_count, 3);
        assert_eq!(config.parameters, LorenzParameters::default());
    }

    #[test]
    fn test_load_layered_without_file() {
        let config = LorenzConfig::load_layered(Some(Path::new("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.parameters, LorenzParameters::default());
    }
}
