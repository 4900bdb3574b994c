//! Desktop launcher for Beyond Styx: lists the published versions,
//! installs and removes them, and starts the game.

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use std::path::PathBuf;
use styx_launcher::{config::LauncherConfig, controller::Controller, gui};

#[derive(Parser, Debug)]
#[command(name = "styx-launcher")]
#[command(version)]
#[command(about = "Install and start Beyond Styx releases", long_about = None)]
struct Cli {
    /// Settings file (default: <config dir>/BeyondStyx/launcher.json)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Folder versions are installed into
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Release listing to query
    #[arg(long, value_name = "URL")]
    releases_url: Option<String>,

    /// Show or hide prereleases in the version list
    #[arg(long, value_name = "BOOL")]
    prereleases: Option<bool>,
}

impl Cli {
    fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(LauncherConfig::default_path)
    }

    fn load_config(&self) -> Result<LauncherConfig> {
        let mut config = match &self.config_path() {
            Some(path) => LauncherConfig::load_or_default(path)
                .with_context(|| format!("reading {}", path.display()))?,
            None => LauncherConfig::default(),
        };

        if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.clone());
        }
        if let Some(url) = &self.releases_url {
            config.releases_url = url.clone();
        }
        if let Some(show) = self.prereleases {
            config.show_prereleases = show;
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.load_config()?;
    let launcher = config
        .launcher()
        .context("no usable data directory for installed versions")?;
    log::info!("installing versions into {}", launcher.path.display());

    let runtime = tokio::runtime::Runtime::new()?;
    let controller = Controller::new(&config, launcher, runtime.handle().clone())?;
    let config_path = cli.config_path();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(gui::WINDOW_TITLE)
            .with_inner_size([520.0, 420.0])
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };

    eframe::run_native(
        gui::WINDOW_TITLE,
        options,
        Box::new(|cc| Ok(Box::new(gui::LauncherApp::new(cc, controller, config_path)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run GUI: {}", e))
}
