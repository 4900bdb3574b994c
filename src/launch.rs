use crate::{
    error::{Error, Result},
    Launcher,
};
use log::info;
use std::process::{Child, Command};

impl Launcher {
    /// Run an installed version as a detached child process.
    /// The game is started from its own folder so relative data paths
    /// resolve next to the executable.
    pub fn start_version(&self, tag: &str) -> Result<Child> {
        if !self.is_version_installed(tag) {
            return Err(Error::MissingExecutable(self.exec_path(tag)));
        }

        let exec_path = self.exec_path(tag);
        let child = Command::new(&exec_path)
            .current_dir(self.installation_path(tag))
            .spawn()?;

        info!("started {} (pid {})", exec_path.display(), child.id());
        Ok(child)
    }
}
