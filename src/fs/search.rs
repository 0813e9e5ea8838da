use crate::fs::directory::read_entries;
use crate::fs::error::{FsError, Result};
use crate::fs::inode::read_inode;
use crate::fs::io::Disk;
use crate::fs::layout::InodeId;

fn join(dir_path: &str, name: &str) -> String {
    if dir_path == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", dir_path, name)
    }
}

// Depth-first walk. Directories are descended into but never reported.
fn search_dir(
    disk: &Disk,
    dir_id: InodeId,
    dir_path: &str,
    pattern: &str,
    max_results: usize,
    results: &mut Vec<String>,
) -> Result<()> {
    let dir = read_inode(disk, dir_id)?;
    for (_, entry) in read_entries(disk, &dir)? {
        if results.len() >= max_results {
            return Ok(());
        }
        if entry.is_dot_or_dotdot() {
            continue;
        }
        let name = entry.name_str();
        let path = join(dir_path, name);
        let child = read_inode(disk, entry.inode_id)?;
        if child.is_dir() {
            search_dir(disk, entry.inode_id, &path, pattern, max_results, results)?;
        } else if name.contains(pattern) {
            results.push(path);
        }
    }
    Ok(())
}

/// Paths of regular files under `start_id` whose name contains `pattern`,
/// at most `max_results` of them. `start_path` prefixes every result.
pub fn search_files_by_name(
    disk: &Disk,
    start_id: InodeId,
    start_path: &str,
    pattern: &str,
    max_results: usize,
) -> Result<Vec<String>> {
    if max_results == 0 {
        return Err(FsError::invalid("max_results must be positive"));
    }
    if !read_inode(disk, start_id)?.is_dir() {
        return Err(FsError::invalid(format!("'{}' is not a directory", start_path)));
    }
    let mut results = Vec::new();
    search_dir(disk, start_id, start_path, pattern, max_results, &mut results)?;
    Ok(results)
}
