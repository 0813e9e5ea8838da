use crate::commands::expect_args;
use crate::context::Context;
use crate::utils::file_man;
use anyhow::anyhow;
use std::path::PathBuf;

/// save [path]
/// Writes the image to `path`, which also becomes the default for later saves.
/// Without an argument uses the image given at startup.
pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    expect_args(argv, 0, 1, "save [path]")?;
    let path = match argv.first() {
        Some(p) => PathBuf::from(p),
        None => context
            .image_path()
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("no image path; use save <path>"))?,
    };
    file_man::save_image(context.fs(), &path)?;
    context.image_path = Some(path);
    println!("OK");
    Ok(())
}
