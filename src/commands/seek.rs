use crate::commands::{expect_args, parse_count, parse_fd};
use crate::context::Context;

/// seek <fd> <offset>
pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    expect_args(argv, 2, 2, "seek <fd> <offset>")?;
    let offset = context
        .fs_mut()
        .fs_seek(parse_fd(argv[0])?, parse_count(argv[1])?)?;
    println!("offset {}", offset);
    Ok(())
}
