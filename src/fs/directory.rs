//! Directory contents: variable-length records packed from offset 0 of a
//! directory's single data block. The directory inode's `file_size` is the
//! number of bytes those records occupy.

use crate::fs::consts::{BLOCK_SIZE, MAX_NAME_LEN};
use crate::fs::error::{FsError, Result};
use crate::fs::inode::{read_inode, unix_now, write_inode};
use crate::fs::io::Disk;
use crate::fs::layout::{BlockId, DirectoryEntry, Inode, InodeId};

fn data_block(dir: &Inode) -> Result<BlockId> {
    match dir.direct_blocks[0] {
        0 => Err(FsError::Corrupt("directory without a data block".into())),
        b => Ok(b),
    }
}

/// Every record of `dir` with its byte offset, including "." and "..".
pub fn read_entries(disk: &Disk, dir: &Inode) -> Result<Vec<(usize, DirectoryEntry)>> {
    let size = dir.file_size as usize;
    if size > BLOCK_SIZE {
        return Err(FsError::Corrupt(format!("directory size {} exceeds one block", size)));
    }
    let data = &disk.block(data_block(dir)?)?[..size];
    let mut entries = Vec::new();
    let mut offset = 0;
    while offset < size {
        let entry = DirectoryEntry::deserialize(data, offset)?;
        let next = offset + entry.record_length as usize;
        entries.push((offset, entry));
        offset = next;
    }
    Ok(entries)
}

/// Looks up `name` in directory `dir_id`. "." and ".." are never matched, and
/// a non-directory inode has no entries.
pub fn find_entry(disk: &Disk, dir_id: InodeId, name: &str) -> Result<Option<InodeId>> {
    let dir = read_inode(disk, dir_id)?;
    if !dir.is_dir() {
        return Ok(None);
    }
    let found = read_entries(disk, &dir)?
        .into_iter()
        .map(|(_, e)| e)
        .filter(|e| !e.is_dot_or_dotdot())
        .find(|e| e.name == name.as_bytes())
        .map(|e| e.inode_id);
    Ok(found)
}

pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(FsError::invalid("empty name"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(FsError::invalid(format!("name longer than {} bytes", MAX_NAME_LEN)));
    }
    if name == "." || name == ".." {
        return Err(FsError::invalid(format!("'{}' is reserved", name)));
    }
    if name.contains('/') || name.contains('\0') {
        return Err(FsError::invalid(format!("'{}' contains '/' or NUL", name)));
    }
    Ok(())
}

fn append_record(disk: &mut Disk, dir: &mut Inode, entry: &DirectoryEntry) -> Result<()> {
    let at = dir.file_size as usize;
    let len = entry.record_length as usize;
    if at + len > BLOCK_SIZE {
        return Err(FsError::ResourceExhausted("directory block is full"));
    }
    let block = disk.block_mut(data_block(dir)?)?;
    entry.serialize(&mut block[at..at + len]);
    dir.file_size += len as u32;
    Ok(())
}

/// Appends `name -> target` to directory `dir_id`. Nothing is written unless
/// every check passes.
pub fn add_entry(disk: &mut Disk, dir_id: InodeId, name: &str, target: InodeId) -> Result<()> {
    validate_name(name)?;
    let mut dir = read_inode(disk, dir_id)?;
    if !dir.is_dir() {
        return Err(FsError::invalid(format!("inode {} is not a directory", dir_id)));
    }
    if find_entry(disk, dir_id, name)?.is_some() {
        return Err(FsError::AlreadyExists(name.to_string()));
    }
    let entry = DirectoryEntry::from_name(name.as_bytes(), target)?;
    append_record(disk, &mut dir, &entry)?;
    dir.mtime = unix_now();
    write_inode(disk, dir_id, &dir)
}

/// Writes "." -> `dir_id` and ".." -> `parent_id` as the first two records.
pub fn init_directory(disk: &mut Disk, dir_id: InodeId, parent_id: InodeId) -> Result<()> {
    let mut dir = read_inode(disk, dir_id)?;
    if !dir.is_dir() {
        return Err(FsError::invalid(format!("inode {} is not a directory", dir_id)));
    }
    dir.file_size = 0;
    append_record(disk, &mut dir, &DirectoryEntry::from_name(b".", dir_id)?)?;
    append_record(disk, &mut dir, &DirectoryEntry::from_name(b"..", parent_id)?)?;
    write_inode(disk, dir_id, &dir)
}

/// Target of the ".." record of `dir_id`.
pub fn parent_of(disk: &Disk, dir_id: InodeId) -> Result<InodeId> {
    let dir = read_inode(disk, dir_id)?;
    if !dir.is_dir() {
        return Err(FsError::invalid(format!("inode {} is not a directory", dir_id)));
    }
    read_entries(disk, &dir)?
        .into_iter()
        .map(|(_, e)| e)
        .find(|e| e.name == b"..")
        .map(|e| e.inode_id)
        .ok_or_else(|| FsError::Corrupt(format!("directory {} has no '..' record", dir_id)))
}

/// True when the directory holds nothing but "." and "..".
pub fn is_empty(disk: &Disk, dir_id: InodeId) -> Result<bool> {
    let dir = read_inode(disk, dir_id)?;
    Ok(read_entries(disk, &dir)?.iter().all(|(_, e)| e.is_dot_or_dotdot()))
}

/// Removes `name` and slides the following records down so the block stays packed.
pub fn remove_entry(disk: &mut Disk, dir_id: InodeId, name: &str) -> Result<InodeId> {
    validate_name(name)?;
    let mut dir = read_inode(disk, dir_id)?;
    if !dir.is_dir() {
        return Err(FsError::invalid(format!("inode {} is not a directory", dir_id)));
    }
    let (offset, entry) = read_entries(disk, &dir)?
        .into_iter()
        .find(|(_, e)| e.name == name.as_bytes())
        .ok_or_else(|| FsError::not_found(name))?;

    let size = dir.file_size as usize;
    let len = entry.record_length as usize;
    let block = disk.block_mut(data_block(&dir)?)?;
    block.copy_within(offset + len..size, offset);
    block[size - len..size].fill(0);

    dir.file_size -= len as u32;
    dir.mtime = unix_now();
    write_inode(disk, dir_id, &dir)?;
    Ok(entry.inode_id)
}
