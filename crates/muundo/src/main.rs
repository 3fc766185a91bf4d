//! Muundo command line
//!
//! Usage:
//!     muundo check
//!     muundo product put '{"Article":"A1","Name":"Chair","Category":"Seating"}'
//!     muundo product list --category Seating
//!     muundo export --out-dir backups
//!     muundo import backups/muundo_database_export_2024-01-01.json
//!     muundo serve --origin https://configurator.example.com/ --listen 0.0.0.0:8080

use clap::Parser;
use muundo::cli::Cli;
use muundo::{commands, CliResult};
use tracing::{debug, error};

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    muundo::tracing::init(&cli.log_level);
    debug!("muundo {} using {}", env!("CARGO_PKG_VERSION"), cli.db.display());

    let mut stdout = std::io::stdout();
    if let Err(e) = commands::run(cli.command, &cli.db, &mut stdout).await {
        error!("{}", e);
        return Err(e);
    }
    Ok(())
}
