use crate::commands::{expect_args, parse_fd};
use crate::context::Context;

/// close <fd>
pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    expect_args(argv, 1, 1, "close <fd>")?;
    context.fs_mut().fs_close(parse_fd(argv[0])?)?;
    println!("OK");
    Ok(())
}
