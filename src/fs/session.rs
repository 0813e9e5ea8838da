use crate::fs::consts::ROOT_INODE;
use crate::fs::layout::InodeId;

/// The single user context of a run: who is acting and where they are.
#[derive(Debug, Clone)]
pub struct Session {
    pub uid: u16,
    pub cwd_path: String,
    pub cwd_inode: InodeId,
    pub show_hidden: bool,
    pub verbose: bool,
}

impl Session {
    /// A session for `uid` standing in the root directory.
    pub fn new(uid: u16) -> Self {
        Self {
            uid,
            cwd_path: "/".to_string(),
            cwd_inode: ROOT_INODE,
            show_hidden: false,
            verbose: false,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(0)
    }
}
