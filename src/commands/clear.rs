//! `clear` command.
//!
//! Sends ESC[2J (erase entire screen) and ESC[H (cursor home).
//! Extra arguments are ignored and file system state is untouched.
use crate::context::Context;
use std::io::Write;

pub fn handle_argv(_argv: &[&str], _context: &mut Context) -> anyhow::Result<()> {
    print!("\x1B[2J\x1B[H");
    std::io::stdout().flush()?;
    Ok(())
}
