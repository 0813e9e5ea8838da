use crate::context::Context;
use crate::fs::Session;
use crate::utils::file_man;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "inofs-emu", version, about = "Inode file system emulator")]
pub struct Cli {
    /// User id the session acts as
    #[arg(long, default_value_t = 0)]
    pub uid: u16,

    /// Disk image to load at start and to write on `save`
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Show dot-files in listings
    #[arg(long)]
    pub hidden: bool,

    /// Long listings
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn session(&self) -> Session {
        Session {
            show_hidden: self.hidden,
            verbose: self.verbose,
            ..Session::new(self.uid)
        }
    }
}

/// Parses the command line and mounts (or formats) the file system it names.
pub fn handle_prog_args() -> anyhow::Result<Context> {
    build_context(Cli::parse())
}

pub fn build_context(cli: Cli) -> anyhow::Result<Context> {
    let session = cli.session();
    let fs = match &cli.image {
        Some(path) => file_man::open_image(path, session)?,
        None => crate::fs::FileSystem::format(session)?,
    };
    Ok(Context::new(fs, cli.image))
}
