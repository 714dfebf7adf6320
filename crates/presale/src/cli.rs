//! CLI arguments for the `presale` binary.

use {clap::Parser, std::path::PathBuf};

/// Run a presale simulation
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// The log filter.
    #[arg(long, env, default_value = "warn,presale=info,smart_pool=debug")]
    pub log: String,

    /// Path to the presale configuration file. This file should be in TOML
    /// format.
    #[arg(long, env)]
    pub config: PathBuf,
}
