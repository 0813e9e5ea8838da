use crate::commands::expect_args;
use crate::context::Context;
use crate::fs::OpenFlag;
use crate::fs::consts::BLOCK_SIZE;
use std::io::{self, Write};

/// Whole contents of `path`. The descriptor may be shared with a handle the
/// user already holds, so its offset is put back before closing.
pub(crate) fn read_all(context: &mut Context, path: &str) -> anyhow::Result<Vec<u8>> {
    let fs = context.fs_mut();
    let fd = fs.fs_open(path, OpenFlag::Read.into())?;
    let saved = fs.fs_tell(fd)?;
    fs.fs_seek(fd, 0)?;
    let mut content = Vec::new();
    let mut chunk = [0u8; BLOCK_SIZE];
    let result = loop {
        match fs.fs_read(fd, &mut chunk) {
            Ok(0) => break Ok(()),
            Ok(n) => content.extend_from_slice(&chunk[..n]),
            Err(e) => break Err(e),
        }
    };
    fs.fs_seek(fd, saved)?;
    fs.fs_close(fd)?;
    result?;
    Ok(content)
}

/// cat <path>
/// Writes the raw bytes to stdout.
pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    expect_args(argv, 1, 1, "cat <path>")?;
    let content = read_all(context, argv[0])?;
    let mut out = io::stdout().lock();
    out.write_all(&content)?;
    if !content.ends_with(b"\n") {
        writeln!(out)?;
    }
    Ok(())
}
