use crate::{
    error::{Error, Result},
    Launcher,
};
use log::{debug, info, warn};
use std::{
    fs::{self, File},
    io::{self, Cursor, Read, Seek},
    path::{Path, PathBuf},
};
use zip::ZipArchive;

impl Launcher {
    /// Folder holding one installed version
    pub fn installation_path(&self, tag: &str) -> PathBuf {
        self.path.join(tag)
    }

    pub fn exec_path(&self, tag: &str) -> PathBuf {
        self.installation_path(tag).join(&self.exec_file)
    }

    /// A version counts as installed once its executable exists
    pub fn is_version_installed(&self, tag: &str) -> bool {
        check_tag(tag).is_ok() && self.exec_path(tag).is_file()
    }

    /// Remove the version folder and everything in it
    pub fn uninstall(&self, tag: &str) -> Result<()> {
        check_tag(tag)?;

        let path = self.installation_path(tag);
        match fs::remove_dir_all(&path) {
            Ok(()) => info!("uninstalled {} from {}", tag, path.display()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("{} was not installed", tag)
            }
            Err(err) => return Err(err.into()),
        }

        Ok(())
    }

    /// Unpack a downloaded archive into the version folder and make
    /// the game executable. `progress` receives `(entry, total)`.
    pub fn install_from_bytes<F>(&self, tag: &str, data: &[u8], progress: F) -> Result<PathBuf>
    where
        F: FnMut(usize, usize),
    {
        check_tag(tag)?;

        let inst_path = self.installation_path(tag);
        fs::create_dir_all(&inst_path)?;

        let written = extract_archive(Cursor::new(data), &inst_path, progress)?;

        let exec_path = self.exec_path(tag);
        if !exec_path.is_file() {
            return Err(Error::MissingExecutable(exec_path));
        }
        set_executable(&exec_path)?;

        info!(
            "installed {} ({} files) into {}",
            tag,
            written,
            inst_path.display()
        );
        Ok(exec_path)
    }
}

/// Tags become folder names, so they must stay a single path component
fn check_tag(tag: &str) -> Result<()> {
    let has_separator = tag.contains(|c: char| c == '/' || c == '\\');
    if tag.is_empty() || tag == "." || tag == ".." || has_separator {
        Err(Error::InvalidTag(tag.to_string()))
    } else {
        Ok(())
    }
}

/// Extract every entry of a zip archive below `dest`, recreating the
/// folder layout. Entries whose path would leave `dest` are skipped.
/// Returns the number of files written.
pub fn extract_archive<R, F>(reader: R, dest: &Path, mut progress: F) -> Result<usize>
where
    R: Read + Seek,
    F: FnMut(usize, usize),
{
    let mut zip = ZipArchive::new(reader)?;
    let count = zip.len();
    let mut written = 0;

    for i in 0..count {
        progress(i, count);

        let mut entry = zip.by_index(i)?;
        let relative = match entry.enclosed_name() {
            Some(path) => path.to_owned(),
            None => {
                warn!("skipping unsafe archive entry {:?}", entry.name());
                continue;
            }
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = File::create(&out_path)?;
        io::copy(&mut entry, &mut file)?;
        debug!("extracted {}", out_path.display());
        written += 1;
    }

    progress(count, count);
    Ok(written)
}

#[cfg(unix)]
pub fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(perms.mode() | 0o100);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
pub fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}
