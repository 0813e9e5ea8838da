use crate::fs::consts::ROOT_INODE;
use crate::fs::directory::{find_entry, parent_of};
use crate::fs::error::{FsError, Result};
use crate::fs::inode::read_inode;
use crate::fs::io::Disk;
use crate::fs::layout::InodeId;

/// Resolves `path` to an inode. Absolute paths start at the root, relative
/// ones at `cwd`. Every component that is walked through must be a directory.
pub fn traverse(disk: &Disk, cwd: InodeId, path: &str) -> Result<InodeId> {
    if path.is_empty() {
        return Err(FsError::invalid("empty path"));
    }
    if path == "/" {
        return Ok(ROOT_INODE);
    }

    let mut current = if path.starts_with('/') { ROOT_INODE } else { cwd };
    for comp in path.split('/').filter(|c| !c.is_empty()) {
        if !read_inode(disk, current)?.is_dir() {
            return Err(FsError::not_found(path));
        }
        current = match comp {
            "." => current,
            ".." => parent_of(disk, current)?,
            name => find_entry(disk, current, name)?.ok_or_else(|| FsError::not_found(path))?,
        };
    }
    Ok(current)
}

/// Splits `path` into the directory part and the final name.
/// A bare name lives in ".", a name directly under root in "/".
pub fn split_parent(path: &str) -> Result<(&str, &str)> {
    let trimmed = path.trim_end_matches('/');
    let (parent, name) = match trimmed.rsplit_once('/') {
        Some(("", name)) => ("/", name),
        Some((parent, name)) => (parent, name),
        None => (".", trimmed),
    };
    if name.is_empty() {
        return Err(FsError::invalid(format!("'{}' has no final component", path)));
    }
    Ok((parent, name))
}

/// Absolute, normalized form of `path` seen from `cwd_path`: collapses `//`,
/// `.` and `..` (which stops at the root).
pub fn normalize(cwd_path: &str, path: &str) -> String {
    let joined = if path.starts_with('/') {
        path.to_string()
    } else if cwd_path.ends_with('/') {
        format!("{}{}", cwd_path, path)
    } else {
        format!("{}/{}", cwd_path, path)
    };

    let mut parts = Vec::new();
    for comp in joined.split('/') {
        match comp {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            name => parts.push(name),
        }
    }
    format!("/{}", parts.join("/"))
}
