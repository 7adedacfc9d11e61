use crate::packager::Arch;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub type ConfigResult<T> = Result<T, anyhow::Error>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SccConfig {
    pub build: Option<BuildConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    pub arch: Option<Arch>,
    pub runtime: Option<PathBuf>,
}

// Optional defaults for packaging, read from an scc.toml next to the input
// file. CLI flags take precedence over anything found here.
pub fn read_config(input_path: &Path) -> ConfigResult<Option<BuildConfig>> {
    let dir = input_path.parent().unwrap_or_else(|| Path::new("."));
    let config_path = dir.join("scc.toml");
    if !config_path.try_exists()? {
        return Ok(None);
    }
    let config_str = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;
    let config: SccConfig = toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse config file at {}", config_path.display()))?;
    Ok(config.build.map(|mut build| {
        // A relative runtime path is resolved against the config file's
        // directory, not the working directory.
        if let Some(runtime) = build.runtime.take() {
            build.runtime = Some(dir.join(runtime));
        }
        build
    }))
}
