use crate::commands::{expect_args, parse_fd};
use crate::context::Context;

/// write <fd> <text...>
/// Words are joined by single spaces.
pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    expect_args(argv, 2, usize::MAX, "write <fd> <text...>")?;
    let fd = parse_fd(argv[0])?;
    let text = argv[1..].join(" ");
    let n = context.fs_mut().fs_write(fd, text.as_bytes())?;
    if n < text.len() {
        log::warn!("short write: {} of {} B", n, text.len());
    }
    println!("{} B written", n);
    Ok(())
}
