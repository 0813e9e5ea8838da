use crate::fs::FileSystem;
use std::path::{Path, PathBuf};

/// Shell state: the mounted file system and the host image it is saved to.
pub struct Context {
    pub(crate) fs: FileSystem,
    pub(crate) image_path: Option<PathBuf>,
    pub(crate) running: bool,
}

impl Context {
    pub fn new(fs: FileSystem, image_path: Option<PathBuf>) -> Self {
        Self {
            fs,
            image_path,
            running: true,
        }
    }

    pub fn fs(&self) -> &FileSystem {
        &self.fs
    }

    pub fn fs_mut(&mut self) -> &mut FileSystem {
        &mut self.fs
    }

    pub fn image_path(&self) -> Option<&Path> {
        self.image_path.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Freshly formatted file system for uid 0, no backing image.
    #[cfg(test)]
    pub(crate) fn scratch() -> Self {
        use crate::fs::Session;
        Self::new(FileSystem::format(Session::default()).unwrap(), None)
    }
}
