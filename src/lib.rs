use std::{fs, path::PathBuf};

pub mod config;
pub mod controller;
pub mod data;
pub mod downloader;
pub mod error;
pub mod filter;
pub mod gui;
pub mod install;
pub mod launch;
pub mod native;
pub mod release;

pub use error::{Error, Result};
pub use release::Release;

/// Root of every installed version of the game
#[derive(Clone, Debug)]
pub struct Launcher {
    pub name: String,
    pub path: PathBuf,

    /// File name of the game executable inside a version folder
    pub exec_file: String,
}

impl Launcher {
    pub fn new(name: String, path: PathBuf) -> Self {
        let exec_file = native::os_exec_name(&name);
        Self {
            name,
            path,
            exec_file,
        }
    }

    /// Create Launcher with just a name, and get
    /// os data dir to create a new folder
    pub fn new_just_name(name: String) -> Option<Self> {
        let path = dirs::data_dir()?.join(&name);
        fs::create_dir_all(&path).ok()?;

        Some(Self::new(name, path))
    }
}
