// cli.rs - Command-line interface configuration
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::DEFAULT_MODEL_ID;

#[derive(Parser, Debug, Clone)]
#[command(name = "chair-loader")]
#[command(about = "Compressed glTF loader with a shared scene cache", long_about = None)]
pub struct Cli {
    /// Directory asset keys are served from
    #[arg(long, env = "CHAIR_ASSET_DIR", default_value = "public", global = true)]
    pub asset_dir: PathBuf,

    /// Fetch over HTTP from this base URL instead of reading files
    #[arg(long, env = "CHAIR_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// JSON model catalog replacing the built-in one
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Mount consumers for a model and report their load results
    Load(LoadArgs),

    /// Write the XOR-obfuscated variant of an asset next to it
    Obfuscate {
        /// Asset to obfuscate
        input: PathBuf,
    },

    /// List the model catalog
    Models,
}

#[derive(clap::Args, Debug, Clone)]
pub struct LoadArgs {
    /// Catalog id of the model to load
    #[arg(default_value = DEFAULT_MODEL_ID)]
    pub model: String,

    /// Consumers mounted per round
    #[arg(long, default_value_t = 1)]
    pub instances: usize,

    /// Mount/unmount cycles; later rounds hit the cache
    #[arg(long, default_value_t = 2)]
    pub rounds: usize,

    /// Start with caching disabled
    #[arg(long = "no-cache", default_value = "false")]
    pub no_cache: bool,

    /// Clear the cache between rounds
    #[arg(long)]
    pub clear_between: bool,

    /// Load the XOR-obfuscated variant
    #[arg(long)]
    pub obfuscated: bool,

    /// Print the cache snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

impl Default for LoadArgs {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL_ID.to_string(),
            instances: 1,
            rounds: 2,
            no_cache: false,
            clear_between: false,
            obfuscated: false,
            json: false,
        }
    }
}
