//! Command line definitions

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "muundo")]
#[command(about = "Muundo configurator persistence and asset proxy")]
#[command(version)]
pub struct Cli {
    /// Store file
    #[arg(long, global = true, env = "MUUNDO_DB", default_value = "MuundoConfigurator.sqlite3")]
    pub db: PathBuf,

    /// Log level (RUST_LOG overrides)
    #[arg(
        long,
        global = true,
        default_value = "info",
        value_parser = ["debug", "info", "warn", "error"]
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Open (provisioning if needed) and describe the store
    Check,

    /// Product catalog records
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },

    /// User configuration records
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Export the whole store as a bundle
    Export(ExportArgs),

    /// Import a bundle, overwriting records with matching keys
    Import {
        /// Bundle file
        file: PathBuf,
    },

    /// Run the storage and export/import self-checks
    SelfTest,

    /// Delete the store file
    Reset,

    /// Serve assets through the cache-first proxy
    Serve(ServeArgs),
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ProductAction {
    /// Store a product (JSON text, or @path to a JSON file)
    Put { record: String },
    Get { article: String },
    /// List products, optionally by category or name
    List {
        #[arg(long, conflicts_with = "name")]
        category: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    Delete { article: String },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum UserAction {
    /// Store a user configuration (JSON text, or @path to a JSON file)
    Put { record: String },
    Get { user_id: String },
    List,
    Delete { user_id: String },
}

#[derive(Args, Debug, PartialEq)]
pub struct ExportArgs {
    /// Directory the dated export file is written to
    #[arg(long, default_value = ".", conflicts_with = "stdout")]
    pub out_dir: PathBuf,

    /// Print the bundle instead of writing a file
    #[arg(long)]
    pub stdout: bool,
}

#[derive(Args, Debug, PartialEq)]
pub struct ServeArgs {
    /// Listen address
    #[arg(long, env = "MUUNDO_LISTEN", default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,

    /// Origin the app is served from; relative requests resolve against it.
    /// Must not be the listen address itself.
    #[arg(long, env = "MUUNDO_ORIGIN")]
    pub origin: String,

    #[arg(long, default_value = muundo_cache::CACHE_NAME)]
    pub cache_name: String,

    /// Network fetch timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Start without pre-caching the app shell
    #[arg(long)]
    pub skip_install: bool,
}
