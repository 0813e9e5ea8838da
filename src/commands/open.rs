use crate::commands::expect_args;
use crate::context::Context;
use crate::fs::OpenFlag;
use anyhow::bail;
use enumflags2::BitFlags;

/// Parses a mode such as `r`, `w`, `rw` or `rwc`.
pub(crate) fn parse_mode(mode: &str) -> anyhow::Result<BitFlags<OpenFlag>> {
    let mut flags = BitFlags::empty();
    for c in mode.chars() {
        flags |= match c {
            'r' => OpenFlag::Read,
            'w' => OpenFlag::Write,
            'c' => OpenFlag::Create,
            _ => bail!("invalid open mode '{mode}' (use r, w, c)"),
        };
    }
    Ok(flags)
}

/// open <path> <mode>
/// Prints the new file descriptor.
pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    expect_args(argv, 2, 2, "open <path> <r|w|rw>[c]")?;
    let flags = parse_mode(argv[1])?;
    let fd = context.fs_mut().fs_open(argv[0], flags)?;
    println!("fd {}", fd);
    Ok(())
}
