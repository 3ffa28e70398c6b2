use std::path::PathBuf;

use clap::Parser;

/// digiear — recognize ambient sounds against reference recordings.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML manifest listing sounds and their reference recordings.
    #[arg(short, long, default_value = "sounds/library.toml")]
    pub library: PathBuf,

    /// Recognition configuration TOML. Defaults apply when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Start idle instead of listening immediately.
    #[arg(long, default_value_t = false)]
    pub no_listen: bool,

    /// Log level: error, warn, info, debug, trace.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
