use crate::fs::{FileSystem, Session};
use anyhow::{Context as _, bail};
use std::path::Path;

/// Loads the image at `path`, or formats a fresh file system when it does not exist yet.
pub fn open_image(path: &Path, session: Session) -> anyhow::Result<FileSystem> {
    if path.is_dir() {
        bail!("path points to a directory, cannot use it as an image: {}", path.display());
    }
    if path.exists() {
        let fs = FileSystem::load_image(path, session)
            .with_context(|| format!("cannot load image '{}'", path.display()))?;
        log::info!("opened existing image {}", path.display());
        Ok(fs)
    } else {
        log::info!("no image at {}, starting from a fresh format", path.display());
        Ok(FileSystem::format(session)?)
    }
}

/// Writes the image, creating missing parent directories.
pub fn save_image(fs: &FileSystem, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create directory '{}'", parent.display()))?;
        }
    }
    fs.save_image(path)
        .with_context(|| format!("cannot write image '{}'", path.display()))
}
