//! Locating and reading `config.toml`.
//!
//! The first hit wins:
//!
//! 1. `--config <path>`
//! 2. the `DOTTIE_CONFIG` environment variable
//! 3. `./dottie/config.toml`
//! 4. the platform config directory (`directories::ProjectDirs`)
//!
//! With none of them present the defaults of [`AppConfig`] apply. A path
//! named by 1 or 2 must exist; the other two are optional.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use dottie::{DottieError, config::AppConfig};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "DOTTIE_CONFIG";

const LOCAL_CONFIG: &str = "dottie/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid TOML in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for DottieError {
    fn from(err: ConfigError) -> Self {
        DottieError::Config(err.to_string())
    }
}

/// Where a config file came from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    /// Named by the user; must exist.
    Required(PathBuf),
    /// Found by probing.
    Discovered(PathBuf),
}

/// Load the configuration, see the module docs for the lookup order.
///
/// # Errors
///
/// A missing file named by `--config` or `DOTTIE_CONFIG`, or any file that
/// does not parse as TOML into [`AppConfig`].
pub fn load_config<P: AsRef<Path>>(explicit_path: Option<P>) -> Result<AppConfig, DottieError> {
    let from_env = env::var_os(CONFIG_ENV).map(PathBuf::from);
    let source = locate(
        explicit_path.as_ref().map(P::as_ref),
        from_env.as_deref(),
        Path::new(LOCAL_CONFIG),
    );

    match source {
        Some(Source::Required(path)) => {
            info!(path:? = path; "Loading named configuration");
            if !path.exists() {
                return Err(ConfigError::MissingFile(path).into());
            }
            read_config(&path)
        }
        Some(Source::Discovered(path)) => {
            info!(path:? = path; "Loading discovered configuration");
            read_config(&path)
        }
        None => {
            debug!("No configuration file found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

fn locate(explicit: Option<&Path>, from_env: Option<&Path>, local: &Path) -> Option<Source> {
    if let Some(path) = explicit.or(from_env) {
        return Some(Source::Required(path.to_path_buf()));
    }
    if local.exists() {
        return Some(Source::Discovered(local.to_path_buf()));
    }

    let Some(dirs) = ProjectDirs::from("com", "dottie", "dottie") else {
        debug!("No platform config directory");
        return None;
    };
    let system = dirs.config_dir().join("config.toml");
    if system.exists() {
        Some(Source::Discovered(system))
    } else {
        debug!(path:? = system; "No system configuration");
        None
    }
}

fn read_config(path: &Path) -> Result<AppConfig, DottieError> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| {
        ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
        .into()
    })
}
