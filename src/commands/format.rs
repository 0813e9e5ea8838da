//! `format` command.
//!
//! Usage:
//!   format
//!
//! Replaces the mounted file system with an empty one: fresh superblock,
//! cleared bitmaps and descriptor table, and a root directory owned by the
//! session user. The session keeps its uid and display flags; the current
//! directory returns to `/`. The host image is untouched until `save`.
use crate::context::Context;
use crate::fs::{FileSystem, Session};

pub fn handle_argv(_argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    let old = context.fs().session();
    let session = Session {
        show_hidden: old.show_hidden,
        verbose: old.verbose,
        ..Session::new(old.uid)
    };
    context.fs = FileSystem::format(session)?;
    println!("OK");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wipes_content_keeps_user() {
        let mut ctx = Context::scratch();
        ctx.fs_mut().session_mut().uid = 42;
        ctx.fs_mut().create_directory("gone").unwrap();
        ctx.fs_mut().cd("gone").unwrap();
        handle_argv(&[], &mut ctx).unwrap();
        assert_eq!(ctx.fs().pwd(), "/");
        assert!(ctx.fs().traverse("/gone").is_err());
        assert_eq!(ctx.fs().uid(), 42);
        assert_eq!(ctx.fs().stat("/").unwrap().owner_id, 42);
    }
}
