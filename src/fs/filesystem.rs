use crate::fs::bitmap::{self, find_free_inode, free_data_block, free_inode};
use crate::fs::consts::{
    BLOCK_COUNT, BLOCK_SIZE, DATA_START, DESCRIPTOR_COUNT, INODE_COUNT, MAX_FILE_SIZE, NUM_DIRECT, ROOT_DIR_BLOCK,
    ROOT_INODE,
};
use crate::fs::descriptor::{self, Fd, OpenFlag};
use crate::fs::directory::{add_entry, find_entry, init_directory, is_empty, read_entries, remove_entry, validate_name};
use crate::fs::error::{FsError, Result};
use crate::fs::inode::{init_inode, read_inode, unix_now, write_inode};
use crate::fs::io::Disk;
use crate::fs::layout::{Inode, InodeId, NodeKind};
use crate::fs::path::{normalize, split_parent, traverse};
use crate::fs::search;
use crate::fs::session::Session;
use crate::fs::superblock::{Superblock, read_superblock, write_superblock};
use enumflags2::BitFlags;
use std::path::Path;

/// One row of a directory listing.
#[derive(Debug, Clone)]
pub struct DirListing {
    pub name: String,
    pub inode_id: InodeId,
    pub inode: Inode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsStats {
    pub block_size: usize,
    pub data_blocks: u32,
    pub free_data_blocks: u32,
    pub inodes: u32,
    pub free_inodes: u32,
    pub descriptors: u32,
    pub open_descriptors: u32,
}

pub struct FileSystem {
    disk: Disk,
    session: Session,
}

impl FileSystem {
    /// Lays out a fresh disk: superblock, bitmaps and a root directory owned by the session user.
    pub fn format(session: Session) -> Result<Self> {
        let mut disk = Disk::new();
        write_superblock(&mut disk, &Superblock::standard())?;
        bitmap::reserve_system_areas(&mut disk)?;

        let mut root = Inode::new(NodeKind::Directory, session.uid, unix_now());
        root.direct_blocks[0] = ROOT_DIR_BLOCK;
        write_inode(&mut disk, ROOT_INODE, &root)?;
        init_directory(&mut disk, ROOT_INODE, ROOT_INODE)?;

        log::debug!("formatted {} blocks of {} B", BLOCK_COUNT, BLOCK_SIZE);
        Ok(Self {
            disk,
            session: Session {
                cwd_path: "/".to_string(),
                cwd_inode: ROOT_INODE,
                ..session
            },
        })
    }

    /// Adopts an existing image. Open handles stored in it are discarded and
    /// the session starts at the root.
    pub fn mount(mut disk: Disk, session: Session) -> Result<Self> {
        read_superblock(&disk)?;
        if !read_inode(&disk, ROOT_INODE)?.is_dir() {
            return Err(FsError::Corrupt("root inode is not a directory".into()));
        }
        descriptor::reset_table(&mut disk)?;
        log::debug!("mounted image");
        Ok(Self {
            disk,
            session: Session {
                cwd_path: "/".to_string(),
                cwd_inode: ROOT_INODE,
                ..session
            },
        })
    }

    pub fn load_image<P: AsRef<Path>>(path: P, session: Session) -> Result<Self> {
        Self::mount(Disk::load(path)?, session)
    }

    pub fn save_image<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.disk.save(path)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn uid(&self) -> u16 {
        self.session.uid
    }

    pub fn cwd_inode(&self) -> InodeId {
        self.session.cwd_inode
    }

    pub fn pwd(&self) -> &str {
        &self.session.cwd_path
    }

    pub fn read_inode(&self, id: InodeId) -> Result<Inode> {
        read_inode(&self.disk, id)
    }

    pub fn find_entry(&self, dir_id: InodeId, name: &str) -> Result<Option<InodeId>> {
        find_entry(&self.disk, dir_id, name)
    }

    pub fn traverse(&self, path: &str) -> Result<InodeId> {
        traverse(&self.disk, self.session.cwd_inode, path)
    }

    fn rollback_inode(&mut self, id: InodeId, inode: &Inode) {
        for &b in inode.direct_blocks.iter().filter(|&&b| b != 0) {
            if let Err(e) = free_data_block(&mut self.disk, b) {
                log::warn!("rollback of block {} failed: {}", b, e);
            }
        }
        if let Err(e) = free_inode(&mut self.disk, id) {
            log::warn!("rollback of inode {} failed: {}", id, e);
        }
    }

    // Allocates, initializes and links a new node; undoes every step on failure.
    fn create_in(&mut self, parent_id: InodeId, name: &str, kind: NodeKind) -> Result<InodeId> {
        validate_name(name)?;
        if !read_inode(&self.disk, parent_id)?.is_dir() {
            return Err(FsError::invalid(format!("inode {} is not a directory", parent_id)));
        }
        if find_entry(&self.disk, parent_id, name)?.is_some() {
            return Err(FsError::AlreadyExists(name.to_string()));
        }

        let id = find_free_inode(&mut self.disk)?.ok_or(FsError::ResourceExhausted("no free inode"))?;
        let inode = match init_inode(&mut self.disk, id, kind, self.session.uid) {
            Ok(inode) => inode,
            Err(e) => {
                if let Err(undo) = free_inode(&mut self.disk, id) {
                    log::warn!("rollback of inode {} failed: {}", id, undo);
                }
                return Err(e);
            }
        };

        let linked = match kind {
            NodeKind::Directory => init_directory(&mut self.disk, id, parent_id),
            NodeKind::File => Ok(()),
        }
        .and_then(|()| add_entry(&mut self.disk, parent_id, name, id));

        if let Err(e) = linked {
            self.rollback_inode(id, &inode);
            return Err(e);
        }
        log::debug!("created {:?} '{}' as inode {} in {}", kind, name, id, parent_id);
        Ok(id)
    }

    /// Creates an empty regular file `name` in the current directory.
    pub fn create_file(&mut self, name: &str) -> Result<InodeId> {
        self.create_in(self.session.cwd_inode, name, NodeKind::File)
    }

    /// Creates directory `name` in the current directory; its ".." is the current directory.
    pub fn create_directory(&mut self, name: &str) -> Result<InodeId> {
        self.create_in(self.session.cwd_inode, name, NodeKind::Directory)
    }

    // Owner bits when the session owns the inode, "other" bits otherwise.
    fn check_access(&self, inode: &Inode, read: bool, write: bool) -> Result<()> {
        let (r, w) = if self.session.uid == inode.owner_id {
            (0o400, 0o200)
        } else {
            (0o004, 0o002)
        };
        if read && inode.permissions & r == 0 {
            return Err(FsError::PermissionDenied("read".into()));
        }
        if write && inode.permissions & w == 0 {
            return Err(FsError::PermissionDenied("write".into()));
        }
        Ok(())
    }

    pub fn fs_open(&mut self, path: &str, flags: BitFlags<OpenFlag>) -> Result<Fd> {
        let read = flags.contains(OpenFlag::Read);
        let write = flags.contains(OpenFlag::Write);
        if !read && !write {
            return Err(FsError::invalid("open needs read and/or write access"));
        }

        let (id, created) = match self.traverse(path) {
            Ok(id) => (id, None),
            Err(FsError::NotFound(_)) if flags.contains(OpenFlag::Create) => {
                let (parent_path, name) = split_parent(path)?;
                let parent = self.traverse(parent_path)?;
                let id = self.create_in(parent, name, NodeKind::File)?;
                (id, Some((parent, name)))
            }
            Err(e) => return Err(e),
        };

        match self.open_inode(path, id, flags) {
            Ok(fd) => Ok(fd),
            Err(e) => {
                if let Some((parent, name)) = created {
                    self.discard_created(parent, name, id);
                }
                Err(e)
            }
        }
    }

    // A file made by a failed open-with-create is unlinked and released again.
    fn discard_created(&mut self, parent: InodeId, name: &str, id: InodeId) {
        if let Err(e) = remove_entry(&mut self.disk, parent, name) {
            log::warn!("rollback of entry '{}' failed: {}", name, e);
        }
        match read_inode(&self.disk, id) {
            Ok(inode) => self.rollback_inode(id, &inode),
            Err(e) => log::warn!("rollback of inode {} failed: {}", id, e),
        }
    }

    fn open_inode(&mut self, path: &str, id: InodeId, flags: BitFlags<OpenFlag>) -> Result<Fd> {
        let mut inode = read_inode(&self.disk, id)?;
        if inode.is_dir() {
            return Err(FsError::invalid(format!("'{}' is a directory", path)));
        }
        self.check_access(&inode, flags.contains(OpenFlag::Read), flags.contains(OpenFlag::Write))?;

        let access = flags & OpenFlag::read_write();
        let fd = match descriptor::find_open(&self.disk, id, access)? {
            Some(fd) => {
                descriptor::retain(&mut self.disk, fd)?;
                fd
            }
            None => descriptor::allocate(&mut self.disk, id, access)?,
        };

        inode.atime = unix_now();
        write_inode(&mut self.disk, id, &inode)?;
        log::debug!("open '{}' (inode {}) -> fd {}", path, id, fd);
        Ok(fd)
    }

    pub fn fs_close(&mut self, fd: Fd) -> Result<()> {
        let left = descriptor::release(&mut self.disk, fd)?;
        log::debug!("close fd {} ({} references left)", fd, left);
        Ok(())
    }

    /// Current offset of the handle.
    pub fn fs_tell(&self, fd: Fd) -> Result<u64> {
        Ok(descriptor::lookup(&self.disk, fd)?.offset)
    }

    /// Moves the handle's offset to `offset` bytes from the start of the file.
    pub fn fs_seek(&mut self, fd: Fd, offset: u64) -> Result<u64> {
        descriptor::lookup(&self.disk, fd)?;
        if offset > MAX_FILE_SIZE {
            return Err(FsError::invalid(format!("offset {} beyond {} B", offset, MAX_FILE_SIZE)));
        }
        descriptor::set_offset(&mut self.disk, fd, offset)?;
        Ok(offset)
    }

    /// Reads up to `buf.len()` bytes at the handle's offset and advances it.
    /// Stops at end of file, at an unallocated direct block, or after the last direct block.
    pub fn fs_read(&mut self, fd: Fd, buf: &mut [u8]) -> Result<usize> {
        let slot = descriptor::lookup(&self.disk, fd)?;
        if !BitFlags::<OpenFlag>::from_bits_truncate(slot.flags).contains(OpenFlag::Read) {
            return Err(FsError::PermissionDenied(format!("fd {} is not open for reading", fd)));
        }
        let mut inode = read_inode(&self.disk, slot.inode_id)?;
        if inode.is_dir() {
            return Err(FsError::invalid("cannot read a directory"));
        }

        let size = inode.file_size as u64;
        let wanted = (buf.len() as u64).min(size.saturating_sub(slot.offset)) as usize;
        let mut done = 0;
        let mut cursor = slot.offset;
        while done < wanted {
            let logical = (cursor / BLOCK_SIZE as u64) as usize;
            if logical >= NUM_DIRECT || inode.direct_blocks[logical] == 0 {
                break;
            }
            let within = (cursor % BLOCK_SIZE as u64) as usize;
            let n = (wanted - done).min(BLOCK_SIZE - within);
            let block = self.disk.block(inode.direct_blocks[logical])?;
            buf[done..done + n].copy_from_slice(&block[within..within + n]);
            done += n;
            cursor += n as u64;
        }

        descriptor::set_offset(&mut self.disk, fd, cursor)?;
        inode.atime = unix_now();
        write_inode(&mut self.disk, slot.inode_id, &inode)?;
        Ok(done)
    }

    /// Writes `data` at the handle's offset, allocating direct blocks on demand.
    /// Returns a short count when the direct blocks or the free blocks run out.
    pub fn fs_write(&mut self, fd: Fd, data: &[u8]) -> Result<usize> {
        let slot = descriptor::lookup(&self.disk, fd)?;
        if !BitFlags::<OpenFlag>::from_bits_truncate(slot.flags).contains(OpenFlag::Write) {
            return Err(FsError::PermissionDenied(format!("fd {} is not open for writing", fd)));
        }
        let mut inode = read_inode(&self.disk, slot.inode_id)?;
        if inode.is_dir() {
            return Err(FsError::invalid("cannot write a directory"));
        }
        if data.is_empty() {
            return Ok(0);
        }

        let mut done = 0;
        let mut cursor = slot.offset;
        while done < data.len() {
            let logical = (cursor / BLOCK_SIZE as u64) as usize;
            if logical >= NUM_DIRECT {
                break;
            }
            if inode.direct_blocks[logical] == 0 {
                match bitmap::find_free_data_block(&mut self.disk)? {
                    Some(b) => inode.direct_blocks[logical] = b,
                    None => break,
                }
            }
            let within = (cursor % BLOCK_SIZE as u64) as usize;
            let n = (data.len() - done).min(BLOCK_SIZE - within);
            let block = self.disk.block_mut(inode.direct_blocks[logical])?;
            block[within..within + n].copy_from_slice(&data[done..done + n]);
            done += n;
            cursor += n as u64;
        }

        if done == 0 {
            return Err(FsError::ResourceExhausted("no room left in file"));
        }
        if cursor > inode.file_size as u64 {
            inode.file_size = cursor as u32;
        }
        let now = unix_now();
        inode.mtime = now;
        inode.atime = now;
        write_inode(&mut self.disk, slot.inode_id, &inode)?;
        descriptor::set_offset(&mut self.disk, fd, cursor)?;
        Ok(done)
    }

    /// Regular files under `start_path` whose names contain `pattern`.
    pub fn search_files_by_name(&self, start_path: &str, pattern: &str, max_results: usize) -> Result<Vec<String>> {
        let start = self.traverse(start_path)?;
        let display = normalize(&self.session.cwd_path, start_path);
        search::search_files_by_name(&self.disk, start, &display, pattern, max_results)
    }

    pub fn cd(&mut self, path: &str) -> Result<()> {
        let id = self.traverse(path)?;
        if !read_inode(&self.disk, id)?.is_dir() {
            return Err(FsError::invalid(format!("'{}' is not a directory", path)));
        }
        self.session.cwd_path = normalize(&self.session.cwd_path, path);
        self.session.cwd_inode = id;
        Ok(())
    }

    /// Entries of the directory at `path`. Dot-names are hidden unless the session shows them.
    pub fn list_directory(&self, path: &str) -> Result<Vec<DirListing>> {
        let id = self.traverse(path)?;
        let dir = read_inode(&self.disk, id)?;
        if !dir.is_dir() {
            return Err(FsError::invalid(format!("'{}' is not a directory", path)));
        }
        let mut listing = Vec::new();
        for (_, entry) in read_entries(&self.disk, &dir)? {
            if !self.session.show_hidden && entry.name.first() == Some(&b'.') {
                continue;
            }
            listing.push(DirListing {
                name: entry.name_str().to_string(),
                inode_id: entry.inode_id,
                inode: read_inode(&self.disk, entry.inode_id)?,
            });
        }
        Ok(listing)
    }

    pub fn stat(&self, path: &str) -> Result<Inode> {
        read_inode(&self.disk, self.traverse(path)?)
    }

    /// Replaces the permission bits. Only the owner may do this.
    pub fn chmod(&mut self, path: &str, permissions: u16) -> Result<()> {
        let id = self.traverse(path)?;
        let mut inode = read_inode(&self.disk, id)?;
        if inode.owner_id != self.session.uid {
            return Err(FsError::PermissionDenied(format!("uid {} does not own '{}'", self.session.uid, path)));
        }
        inode.permissions = permissions & 0o777;
        write_inode(&mut self.disk, id, &inode)
    }

    // Parent inode and child inode of `path`, without following the final component twice.
    fn locate(&self, path: &str) -> Result<(InodeId, String, InodeId)> {
        let (parent_path, name) = split_parent(path)?;
        let parent = self.traverse(parent_path)?;
        let id = find_entry(&self.disk, parent, name)?.ok_or_else(|| FsError::not_found(path))?;
        Ok((parent, name.to_string(), id))
    }

    fn release_node(&mut self, id: InodeId) -> Result<()> {
        let mut inode = read_inode(&self.disk, id)?;
        for b in inode.direct_blocks.iter_mut().filter(|b| **b != 0) {
            free_data_block(&mut self.disk, *b)?;
            *b = 0;
        }
        inode.dtime = unix_now();
        write_inode(&mut self.disk, id, &inode)?;
        free_inode(&mut self.disk, id)
    }

    pub fn delete_file(&mut self, path: &str) -> Result<()> {
        let (parent, name, id) = self.locate(path)?;
        if read_inode(&self.disk, id)?.is_dir() {
            return Err(FsError::invalid(format!("'{}' is a directory", path)));
        }
        if descriptor::is_inode_open(&self.disk, id)? {
            return Err(FsError::invalid(format!("'{}' is open", path)));
        }
        remove_entry(&mut self.disk, parent, &name)?;
        self.release_node(id)?;
        log::debug!("deleted file '{}' (inode {})", path, id);
        Ok(())
    }

    pub fn remove_directory(&mut self, path: &str) -> Result<()> {
        let (parent, name, id) = self.locate(path)?;
        if !read_inode(&self.disk, id)?.is_dir() {
            return Err(FsError::invalid(format!("'{}' is not a directory", path)));
        }
        if id == self.session.cwd_inode {
            return Err(FsError::invalid("cannot remove the current directory"));
        }
        if !is_empty(&self.disk, id)? {
            return Err(FsError::invalid(format!("'{}' is not empty", path)));
        }
        remove_entry(&mut self.disk, parent, &name)?;
        self.release_node(id)?;
        log::debug!("removed directory '{}' (inode {})", path, id);
        Ok(())
    }

    pub fn statfs(&self) -> Result<FsStats> {
        Ok(FsStats {
            block_size: BLOCK_SIZE,
            data_blocks: BLOCK_COUNT - DATA_START,
            free_data_blocks: bitmap::free_data_block_count(&self.disk)?,
            inodes: INODE_COUNT,
            free_inodes: bitmap::free_inode_count(&self.disk)?,
            descriptors: DESCRIPTOR_COUNT,
            open_descriptors: descriptor::open_count(&self.disk)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::directory::read_entries;
    use crate::fs::layout::DirectoryEntry;

    fn fresh() -> FileSystem {
        FileSystem::format(Session::new(1000)).unwrap()
    }

    fn rw_create() -> BitFlags<OpenFlag> {
        OpenFlag::Read | OpenFlag::Write | OpenFlag::Create
    }

    #[test]
    fn root_is_its_own_parent() {
        let fs = fresh();
        assert_eq!(fs.traverse("/").unwrap(), ROOT_INODE);
        assert_eq!(fs.traverse("/..").unwrap(), ROOT_INODE);
        assert_eq!(fs.traverse(".").unwrap(), ROOT_INODE);
        let root = fs.read_inode(ROOT_INODE).unwrap();
        assert!(root.is_dir());
        assert_eq!(root.direct_blocks[0], ROOT_DIR_BLOCK);
        assert_eq!(root.owner_id, 1000);
    }

    #[test]
    fn mkdir_home_under_root() {
        let mut fs = fresh();
        let home = fs.create_directory("home").unwrap();
        let found = fs.find_entry(ROOT_INODE, "home").unwrap().unwrap();
        assert_eq!(found, home);
        assert_ne!(found, ROOT_INODE);
        assert!(fs.read_inode(found).unwrap().is_dir());
        assert_eq!(fs.traverse("/home").unwrap(), home);
    }

    #[test]
    fn new_directory_dots_point_at_self_and_creation_cwd() {
        let mut fs = fresh();
        let home = fs.create_directory("home").unwrap();
        fs.cd("home").unwrap();
        let user = fs.create_directory("user").unwrap();

        let inode = fs.read_inode(user).unwrap();
        let entries = read_entries(&fs.disk, &inode).unwrap();
        assert_eq!(entries[0].1.name, b".");
        assert_eq!(entries[0].1.inode_id, user);
        assert_eq!(entries[1].1.name, b"..");
        assert_eq!(entries[1].1.inode_id, home);
        assert_eq!(fs.traverse("/home/user/..").unwrap(), home);
    }

    #[test]
    fn traverse_through_a_file_is_not_found() {
        let mut fs = fresh();
        fs.create_file("a").unwrap();
        assert!(matches!(fs.traverse("/a/b"), Err(FsError::NotFound(_))));
        fs.create_directory("d").unwrap();
        assert!(matches!(fs.traverse("/d/missing"), Err(FsError::NotFound(_))));
        assert!(matches!(fs.traverse("/nope/x"), Err(FsError::NotFound(_))));
        assert!(matches!(fs.traverse(""), Err(FsError::InvalidInput(_))));
    }

    #[test]
    fn relative_paths_start_at_cwd() {
        let mut fs = fresh();
        let a = fs.create_directory("a").unwrap();
        fs.cd("a").unwrap();
        let b = fs.create_directory("b").unwrap();
        assert_eq!(fs.traverse("b").unwrap(), b);
        assert_eq!(fs.traverse("./b/..").unwrap(), a);
        assert_eq!(fs.traverse("/a/b").unwrap(), b);
        assert!(matches!(fs.traverse("a"), Err(FsError::NotFound(_))));
        assert_eq!(fs.pwd(), "/a");
        fs.cd("b/../..").unwrap();
        assert_eq!(fs.pwd(), "/");
        assert_eq!(fs.cwd_inode(), ROOT_INODE);
    }

    #[test]
    fn open_missing_without_create_is_not_found() {
        let mut fs = fresh();
        assert!(matches!(
            fs.fs_open("/missing.txt", OpenFlag::Read.into()),
            Err(FsError::NotFound(_))
        ));
        let fd = fs.fs_open("/missing.txt", OpenFlag::Read | OpenFlag::Create).unwrap();
        let id = fs.traverse("/missing.txt").unwrap();
        let inode = fs.read_inode(id).unwrap();
        assert!(inode.is_file());
        assert_eq!(inode.file_size, 0);
        fs.fs_close(fd).unwrap();
    }

    #[test]
    fn create_through_open_uses_the_path_parent() {
        let mut fs = fresh();
        fs.create_directory("docs").unwrap();
        fs.cd("docs").unwrap();
        let fd = fs.fs_open("/top.txt", rw_create()).unwrap();
        fs.fs_close(fd).unwrap();
        assert!(fs.find_entry(ROOT_INODE, "top.txt").unwrap().is_some());
        assert!(matches!(fs.traverse("top.txt"), Err(FsError::NotFound(_))));
    }

    #[test]
    fn write_close_reopen_read() {
        let mut fs = fresh();
        let fd = fs.fs_open("/f.txt", rw_create()).unwrap();
        assert_eq!(fs.fs_write(fd, b"0123456789").unwrap(), 10);
        fs.fs_close(fd).unwrap();

        let fd = fs.fs_open("/f.txt", OpenFlag::Read.into()).unwrap();
        let mut buf = [0u8; 10];
        assert_eq!(fs.fs_read(fd, &mut buf).unwrap(), 10);
        assert_eq!(&buf, b"0123456789");
        assert_eq!(descriptor::lookup(&fs.disk, fd).unwrap().offset, 10);
        assert_eq!(fs.fs_read(fd, &mut buf).unwrap(), 0);
        fs.fs_close(fd).unwrap();
    }

    #[test]
    fn read_back_at_arbitrary_offsets_across_blocks() {
        let mut fs = fresh();
        let fd = fs.fs_open("/big", rw_create()).unwrap();
        let cases = [(0u64, 1usize), (100, 3000), (2047, 2), (4000, 8288), (BLOCK_SIZE as u64 * 5, BLOCK_SIZE)];
        for (i, &(offset, len)) in cases.iter().enumerate() {
            assert!(offset + len as u64 <= MAX_FILE_SIZE);
            let data: Vec<u8> = (0..len).map(|j| (j * 7 + i) as u8).collect();
            fs.fs_seek(fd, offset).unwrap();
            assert_eq!(fs.fs_write(fd, &data).unwrap(), len);
            fs.fs_seek(fd, offset).unwrap();
            let mut out = vec![0u8; len];
            assert_eq!(fs.fs_read(fd, &mut out).unwrap(), len);
            assert_eq!(out, data);
        }
        fs.fs_close(fd).unwrap();
    }

    #[test]
    fn writes_stop_at_the_direct_block_ceiling() {
        let mut fs = fresh();
        let fd = fs.fs_open("/cap", rw_create()).unwrap();
        let data = vec![0xEEu8; MAX_FILE_SIZE as usize + 100];
        assert_eq!(fs.fs_write(fd, &data).unwrap(), MAX_FILE_SIZE as usize);
        assert!(matches!(fs.fs_write(fd, b"x"), Err(FsError::ResourceExhausted(_))));

        let id = fs.traverse("/cap").unwrap();
        assert_eq!(fs.read_inode(id).unwrap().file_size as u64, MAX_FILE_SIZE);
        fs.fs_seek(fd, 0).unwrap();
        let mut out = vec![0u8; data.len()];
        assert_eq!(fs.fs_read(fd, &mut out).unwrap(), MAX_FILE_SIZE as usize);
    }

    #[test]
    fn open_create_is_undone_when_the_descriptor_table_is_full() {
        let mut fs = fresh();
        for _ in 0..DESCRIPTOR_COUNT {
            descriptor::allocate(&mut fs.disk, 77, OpenFlag::Read.into()).unwrap();
        }
        let before = fs.statfs().unwrap();
        let root_size = fs.read_inode(ROOT_INODE).unwrap().file_size;

        assert!(matches!(
            fs.fs_open("/new.txt", OpenFlag::Read | OpenFlag::Create),
            Err(FsError::ResourceExhausted(_))
        ));
        assert!(matches!(fs.traverse("/new.txt"), Err(FsError::NotFound(_))));
        assert_eq!(fs.statfs().unwrap(), before);
        assert_eq!(fs.read_inode(ROOT_INODE).unwrap().file_size, root_size);
    }

    #[test]
    fn failed_open_of_an_existing_file_keeps_it() {
        let mut fs = fresh();
        fs.create_file("kept").unwrap();
        for _ in 0..DESCRIPTOR_COUNT {
            descriptor::allocate(&mut fs.disk, 77, OpenFlag::Read.into()).unwrap();
        }
        assert!(fs.fs_open("/kept", OpenFlag::Write | OpenFlag::Create).is_err());
        assert!(fs.traverse("/kept").is_ok());
    }

    #[test]
    fn write_returns_short_count_when_data_blocks_run_out() {
        let mut fs = fresh();
        let fd = fs.fs_open("/tight", rw_create()).unwrap();
        let free = bitmap::free_data_block_count(&fs.disk).unwrap();
        for _ in 0..free - 1 {
            bitmap::find_free_data_block(&mut fs.disk).unwrap().unwrap();
        }
        assert_eq!(bitmap::free_data_block_count(&fs.disk).unwrap(), 1);

        // first direct block came with the file, one more is left on disk
        let data = vec![0x5Au8; BLOCK_SIZE * 3];
        assert_eq!(fs.fs_write(fd, &data).unwrap(), BLOCK_SIZE * 2);

        let inode = fs.stat("/tight").unwrap();
        assert_eq!(inode.file_size as usize, BLOCK_SIZE * 2);
        assert_ne!(inode.direct_blocks[0], 0);
        assert_ne!(inode.direct_blocks[1], 0);
        assert_eq!(inode.direct_blocks[2], 0);
        assert_eq!(fs.fs_tell(fd).unwrap(), BLOCK_SIZE as u64 * 2);
        assert!(matches!(fs.fs_write(fd, b"more"), Err(FsError::ResourceExhausted(_))));
    }

    #[test]
    fn overwrite_never_shrinks() {
        let mut fs = fresh();
        let fd = fs.fs_open("/s", rw_create()).unwrap();
        fs.fs_write(fd, b"hello world").unwrap();
        fs.fs_seek(fd, 0).unwrap();
        fs.fs_write(fd, b"HE").unwrap();
        let id = fs.traverse("/s").unwrap();
        assert_eq!(fs.read_inode(id).unwrap().file_size, 11);
        fs.fs_seek(fd, 0).unwrap();
        let mut out = [0u8; 32];
        let n = fs.fs_read(fd, &mut out).unwrap();
        assert_eq!(&out[..n], b"HEllo world");
    }

    #[test]
    fn read_stops_at_a_hole() {
        let mut fs = fresh();
        let fd = fs.fs_open("/sparse", rw_create()).unwrap();
        fs.fs_write(fd, b"abc").unwrap();
        fs.fs_seek(fd, BLOCK_SIZE as u64 * 2).unwrap();
        fs.fs_write(fd, b"xyz").unwrap();
        fs.fs_seek(fd, 0).unwrap();
        let mut out = vec![0u8; BLOCK_SIZE * 3];
        // first block present, second never allocated
        assert_eq!(fs.fs_read(fd, &mut out).unwrap(), BLOCK_SIZE);
        assert_eq!(&out[..3], b"abc");
    }

    #[test]
    fn reopening_shares_a_slot_until_last_close() {
        let mut fs = fresh();
        let a = fs.fs_open("/shared", rw_create()).unwrap();
        let b = fs.fs_open("/shared", OpenFlag::read_write()).unwrap();
        assert_eq!(a, b);
        assert_eq!(descriptor::lookup(&fs.disk, a).unwrap().ref_count, 2);
        let r = fs.fs_open("/shared", OpenFlag::Read.into()).unwrap();
        assert_ne!(r, a);

        fs.fs_close(a).unwrap();
        assert!(descriptor::lookup(&fs.disk, a).is_ok());
        fs.fs_close(b).unwrap();
        assert!(matches!(fs.fs_close(a), Err(FsError::InvalidInput(_))));
        assert_eq!(fs.statfs().unwrap().open_descriptors, 1);
    }

    #[test]
    fn handle_mode_is_enforced() {
        let mut fs = fresh();
        let w = fs.fs_open("/m", OpenFlag::Write | OpenFlag::Create).unwrap();
        let mut buf = [0u8; 4];
        assert!(matches!(fs.fs_read(w, &mut buf), Err(FsError::PermissionDenied(_))));
        let r = fs.fs_open("/m", OpenFlag::Read.into()).unwrap();
        assert!(matches!(fs.fs_write(r, b"x"), Err(FsError::PermissionDenied(_))));
        assert!(matches!(fs.fs_open("/m", BitFlags::empty()), Err(FsError::InvalidInput(_))));
    }

    #[test]
    fn permissions_follow_owner_or_other_bits() {
        let mut fs = fresh();
        let fd = fs.fs_open("/p", rw_create()).unwrap();
        fs.fs_close(fd).unwrap();

        fs.session_mut().uid = 2000;
        // 0o644: others may read but not write
        let fd = fs.fs_open("/p", OpenFlag::Read.into()).unwrap();
        fs.fs_close(fd).unwrap();
        assert!(matches!(
            fs.fs_open("/p", OpenFlag::Write.into()),
            Err(FsError::PermissionDenied(_))
        ));
        assert!(matches!(fs.chmod("/p", 0o666), Err(FsError::PermissionDenied(_))));

        fs.session_mut().uid = 1000;
        fs.chmod("/p", 0o200).unwrap();
        assert!(matches!(
            fs.fs_open("/p", OpenFlag::Read.into()),
            Err(FsError::PermissionDenied(_))
        ));
        let fd = fs.fs_open("/p", OpenFlag::Write.into()).unwrap();
        fs.fs_close(fd).unwrap();
    }

    #[test]
    fn directories_cannot_be_opened() {
        let mut fs = fresh();
        fs.create_directory("d").unwrap();
        assert!(matches!(fs.fs_open("/d", OpenFlag::Read.into()), Err(FsError::InvalidInput(_))));
        assert!(matches!(fs.fs_open("/", OpenFlag::Read.into()), Err(FsError::InvalidInput(_))));
    }

    #[test]
    fn failed_create_releases_its_inode_and_block() {
        let mut fs = fresh();
        let before = fs.statfs().unwrap();
        assert!(matches!(fs.create_file(""), Err(FsError::InvalidInput(_))));
        fs.create_file("dup").unwrap();
        assert!(matches!(fs.create_file("dup"), Err(FsError::AlreadyExists(_))));

        // fill the root block so the next link fails after allocation would have happened
        let mut n = 0;
        loop {
            match fs.create_directory(&format!("{:0>200}", n)) {
                Ok(_) => n += 1,
                Err(FsError::ResourceExhausted(_)) => break,
                Err(e) => panic!("unexpected {e}"),
            }
        }
        let full = fs.statfs().unwrap();
        assert_eq!(full.free_inodes, before.free_inodes - 1 - n);
        assert_eq!(full.free_data_blocks, before.free_data_blocks - 1 - n);
        let size = fs.read_inode(ROOT_INODE).unwrap().file_size as usize;
        assert!(size + DirectoryEntry::record_length_for(200) > BLOCK_SIZE);
    }

    #[test]
    fn search_reports_files_only() {
        let mut fs = fresh();
        fs.create_file("report.txt").unwrap();
        fs.create_directory("reports").unwrap();
        fs.cd("reports").unwrap();
        fs.create_file("report-2024.txt").unwrap();
        fs.create_file("other").unwrap();
        fs.create_directory("deep").unwrap();
        fs.cd("deep").unwrap();
        fs.create_file("old_report").unwrap();
        fs.cd("/").unwrap();

        let mut found = fs.search_files_by_name("/", "report", 10).unwrap();
        found.sort();
        assert_eq!(
            found,
            vec!["/report.txt", "/reports/deep/old_report", "/reports/report-2024.txt"]
        );
        assert_eq!(fs.search_files_by_name("/", "report", 2).unwrap().len(), 2);
        assert_eq!(
            fs.search_files_by_name("reports/", "report", 10).unwrap().len(),
            2
        );
        assert!(matches!(
            fs.search_files_by_name("/report.txt", "r", 10),
            Err(FsError::InvalidInput(_))
        ));
        assert!(matches!(fs.search_files_by_name("/", "r", 0), Err(FsError::InvalidInput(_))));
    }

    #[test]
    fn delete_file_returns_resources() {
        let mut fs = fresh();
        let before = fs.statfs().unwrap();
        let fd = fs.fs_open("/gone", rw_create()).unwrap();
        fs.fs_write(fd, &vec![1u8; BLOCK_SIZE * 2 + 1]).unwrap();
        assert!(matches!(fs.delete_file("/gone"), Err(FsError::InvalidInput(_))));
        fs.fs_close(fd).unwrap();

        let id = fs.traverse("/gone").unwrap();
        fs.delete_file("/gone").unwrap();
        assert!(matches!(fs.traverse("/gone"), Err(FsError::NotFound(_))));
        assert_eq!(fs.statfs().unwrap(), before);
        assert_ne!(fs.read_inode(id).unwrap().dtime, 0);
        assert!(matches!(fs.delete_file("/gone"), Err(FsError::NotFound(_))));
    }

    #[test]
    fn rmdir_rules() {
        let mut fs = fresh();
        fs.create_directory("d").unwrap();
        fs.cd("d").unwrap();
        fs.create_file("f").unwrap();
        assert!(matches!(fs.remove_directory("/d"), Err(FsError::InvalidInput(_))));
        fs.delete_file("f").unwrap();
        assert!(matches!(fs.remove_directory("/d"), Err(FsError::InvalidInput(_))));
        fs.cd("..").unwrap();
        assert!(matches!(fs.delete_file("d"), Err(FsError::InvalidInput(_))));
        fs.remove_directory("d").unwrap();
        assert!(matches!(fs.traverse("/d"), Err(FsError::NotFound(_))));
        assert!(fs.remove_directory("/").is_err());
    }

    #[test]
    fn listing_hides_dot_names_by_default() {
        let mut fs = fresh();
        fs.create_file(".hidden").unwrap();
        fs.create_file("shown").unwrap();
        let names: Vec<_> = fs.list_directory("/").unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["shown"]);
        fs.session_mut().show_hidden = true;
        let names: Vec<_> = fs.list_directory("/").unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec![".", "..", ".hidden", "shown"]);
    }

    #[test]
    fn cd_into_a_file_is_rejected() {
        let mut fs = fresh();
        fs.create_file("f").unwrap();
        assert!(matches!(fs.cd("f"), Err(FsError::InvalidInput(_))));
        assert!(matches!(fs.cd("nope"), Err(FsError::NotFound(_))));
        assert_eq!(fs.pwd(), "/");
    }

    #[test]
    fn image_survives_save_and_load() {
        let path = std::env::temp_dir().join(format!("inofs-fs-{}.img", std::process::id()));
        let mut fs = fresh();
        fs.create_directory("keep").unwrap();
        let fd = fs.fs_open("/keep/data", rw_create()).unwrap();
        fs.fs_write(fd, b"persisted").unwrap();
        fs.save_image(&path).unwrap();

        let mut loaded = FileSystem::load_image(&path, Session::new(1000)).unwrap();
        assert_eq!(loaded.statfs().unwrap().open_descriptors, 0);
        let fd = loaded.fs_open("/keep/data", OpenFlag::Read.into()).unwrap();
        let mut out = [0u8; 9];
        assert_eq!(loaded.fs_read(fd, &mut out).unwrap(), 9);
        assert_eq!(&out, b"persisted");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn mounting_a_blank_disk_fails() {
        assert!(matches!(
            FileSystem::mount(Disk::new(), Session::default()),
            Err(FsError::Corrupt(_))
        ));
    }
}
