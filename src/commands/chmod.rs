use crate::commands::expect_args;
use crate::context::Context;
use anyhow::{Context as _, bail};

/// Octal permission string such as `644` or `0600`.
pub(crate) fn parse_octal(arg: &str) -> anyhow::Result<u16> {
    let bits = u16::from_str_radix(arg, 8).with_context(|| format!("'{arg}' is not an octal mode"))?;
    if bits > 0o777 {
        bail!("mode {arg} out of range (max 777)");
    }
    Ok(bits)
}

/// chmod <octal> <path>
/// Only the owner may change permissions.
pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    expect_args(argv, 2, 2, "chmod <octal> <path>")?;
    let bits = parse_octal(argv[0])?;
    context.fs_mut().chmod(argv[1], bits)?;
    println!("OK");
    Ok(())
}
