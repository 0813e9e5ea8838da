mod commands;
mod context;
mod utils;

use inofs_emu::fs;
use utils::{arg_man, tui};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let mut context = arg_man::handle_prog_args()?;
    tui::handle_app_loop(&mut context);
    Ok(())
}
