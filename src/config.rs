use crate::{error::Result, Launcher};
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

pub const DEFAULT_APP_NAME: &str = "BeyondStyx";
pub const RELEASES_URL: &str =
    "https://api.github.com/repos/C10H16N5O12P3/BeyondStyx-release/releases";
pub const CONFIG_FILE: &str = "launcher.json";

/// Launcher settings. Every field is optional in the file and falls
/// back to its default.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct LauncherConfig {
    /// Game name, also the executable name and data folder name
    pub app_name: String,
    pub releases_url: String,
    pub user_agent: String,

    /// Where versions get installed. Defaults to the OS data dir.
    pub data_dir: Option<PathBuf>,
    pub show_prereleases: bool,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            releases_url: RELEASES_URL.to_string(),
            user_agent: format!("styx-launcher/{}", env!("CARGO_PKG_VERSION")),
            data_dir: None,
            show_prereleases: true,
        }
    }
}

impl LauncherConfig {
    /// `<config dir>/BeyondStyx/launcher.json`
    pub fn default_path() -> Option<PathBuf> {
        Some(
            dirs::config_dir()?
                .join(DEFAULT_APP_NAME)
                .join(CONFIG_FILE),
        )
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Like `load`, but a missing file gives the defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(crate::Error::File(err)) if err.kind() == io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Rewrite one setting in the file, leaving the others as stored.
    /// Command line overrides never reach the file this way.
    pub fn update_file<F>(path: &Path, change: F) -> Result<()>
    where
        F: FnOnce(&mut Self),
    {
        let mut stored = Self::load_or_default(path)?;
        change(&mut stored);
        stored.save(path)
    }

    /// Build the launcher rooted at the configured data dir
    pub fn launcher(&self) -> Option<Launcher> {
        match &self.data_dir {
            Some(path) => {
                fs::create_dir_all(path).ok()?;
                Some(Launcher::new(self.app_name.clone(), path.clone()))
            }
            None => Launcher::new_just_name(self.app_name.clone()),
        }
    }
}
