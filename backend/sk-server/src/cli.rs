use sk_config::DEFAULT_CONFIG_PATH;

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "sk-server", version, about = "Service skeleton: API, metrics and diagnostics servers")]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Skip the metrics and diagnostics servers
    #[arg(long)]
    pub disable_aux_servers: bool,
}
