//! Command line surface.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "searchmon", version, about = "Report RediSearch index health across a Redis fleet")]
pub struct Cli {
    /// Build identifier shown in the report header
    pub build_number: String,

    /// Path to the YAML config (defaults to $SEARCHMON_CONFIG, then searchmon.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Skip the webhook notification
    #[arg(long)]
    pub no_notify: bool,

    /// Print the report as JSON instead of text
    #[arg(long)]
    pub json: bool,
}
