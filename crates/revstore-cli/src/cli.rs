use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "revstore", about = "Versioned object store", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Node config file; defaults are used if it does not exist
    #[arg(long, global = true, default_value = "revstore.toml")]
    pub config: PathBuf,

    /// Datastore path, overriding the config file
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Onboard the node config into the store if it is not there yet
    Init,
    /// Print a stored object
    Get(IdArgs),
    /// Create or update an object
    Put(PutArgs),
    /// Delete an object
    Delete(IdArgs),
    /// List identifiers in an environment
    List(ListArgs),
    /// Show the revision history of an object
    History(IdArgs),
    /// Check an object's revision against its history and payload
    Verify(IdArgs),
}

#[derive(Args)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Args)]
pub struct PutArgs {
    pub id: String,
    /// Environment tag; required when creating
    #[arg(long)]
    pub env: Option<String>,
    /// Type tag; required when creating
    #[arg(long = "type")]
    pub kind: Option<String>,
    /// Payload as JSON
    #[arg(long)]
    pub data: String,
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(long)]
    pub env: String,
    #[arg(long = "type", default_value = revstore_store::ALL_TYPES)]
    pub kind: String,
}
