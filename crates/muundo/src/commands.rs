//! Command dispatch

use std::io::Write;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use muundo_cache::{router, AssetProxy, ProxyConfig};
use muundo_core::{LoaderState, ProductRecord, Record, UserConfigRecord};
use muundo_sqlite::{MuundoDb, Repository, StorageEngine};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use url::{Host, Url};

use crate::cli::{Command, ExportArgs, ProductAction, ServeArgs, UserAction};
use crate::tracing::prefix;
use crate::{self_test, CliResult};

/// Run one command, writing its output to `out`.
///
/// Every command except `reset` and `serve` opens the store first,
/// provisioning it if needed.
pub async fn run(command: Command, db_path: &Path, out: &mut impl Write) -> CliResult<()> {
    match command {
        Command::Reset => reset(db_path, out),
        Command::Serve(args) => serve(args).await,
        Command::Check => check(&MuundoDb::open(db_path).await?, out).await,
        Command::Product { action } => {
            let db = MuundoDb::open(db_path).await?;
            product(action, db.products(), out).await
        }
        Command::User { action } => {
            let db = MuundoDb::open(db_path).await?;
            user(action, db.user_configs(), out).await
        }
        Command::Export(args) => export(args, &MuundoDb::open(db_path).await?, out).await,
        Command::Import { file } => import(&file, &MuundoDb::open(db_path).await?, out).await,
        Command::SelfTest => {
            let db = MuundoDb::open(db_path).await?;
            let report = self_test::run(&db).await?;
            writeln!(
                out,
                "self-test passed ({} products, {} user configurations reimported)",
                report.import.products_imported, report.import.configurations_imported
            )?;
            Ok(())
        }
    }
}

async fn check(db: &MuundoDb, out: &mut impl Write) -> CliResult<()> {
    let info = db.check().await?;
    writeln!(out, "store:   {}", info.path.display())?;
    writeln!(out, "version: {}", info.version)?;
    for collection in &info.collections {
        writeln!(out, "collection {}", collection)?;
    }
    for index in &info.indexes {
        writeln!(out, "index {} on {}", index.name, index.collection)?;
    }
    Ok(())
}

async fn import(file: &Path, db: &MuundoDb, out: &mut impl Write) -> CliResult<()> {
    let json = tokio::fs::read_to_string(file).await?;
    let summary = db.transfer().import_json(&json).await?;
    writeln!(
        out,
        "imported {} products, {} user configurations",
        summary.products_imported, summary.configurations_imported
    )?;
    Ok(())
}

fn reset(db_path: &Path, out: &mut impl Write) -> CliResult<()> {
    StorageEngine::destroy(db_path)?;
    info!("{} Deleted store {}", prefix::DB, db_path.display());
    writeln!(out, "deleted {}", db_path.display())?;
    Ok(())
}

/// Record text from a command argument: inline JSON, or `@path` to read it
/// from a file.
async fn record_text(arg: &str) -> CliResult<String> {
    match arg.strip_prefix('@') {
        Some(path) => Ok(tokio::fs::read_to_string(path).await?),
        None => Ok(arg.to_string()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T, out: &mut impl Write) -> CliResult<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

async fn product(
    action: ProductAction,
    products: &Repository<ProductRecord>,
    out: &mut impl Write,
) -> CliResult<()> {
    match action {
        ProductAction::Put { record } => {
            let record = ProductRecord::from_json(&record_text(&record).await?)?;
            let article = record.article.clone();
            products.store(record).await?;
            writeln!(out, "stored product {}", article)?;
        }
        ProductAction::Get { article } => {
            print_json(&products.fetch_by_key(&article).await?, out)?;
        }
        ProductAction::List { category, name } => {
            let records = match (category, name) {
                (Some(category), _) => products.fetch_by_index("CategoryIndex", &category).await?,
                (None, Some(name)) => products.fetch_by_index("NameIndex", &name).await?,
                (None, None) => products.fetch_all().await?,
            };
            print_json(&records, out)?;
        }
        ProductAction::Delete { article } => {
            products.delete(&article).await?;
            writeln!(out, "deleted product {}", article)?;
        }
    }
    Ok(())
}

async fn user(
    action: UserAction,
    user_configs: &Repository<UserConfigRecord>,
    out: &mut impl Write,
) -> CliResult<()> {
    match action {
        UserAction::Put { record } => {
            let record = UserConfigRecord::from_json(&record_text(&record).await?)?;
            let user_id = record.user_id.clone();
            user_configs.store(record).await?;
            writeln!(out, "stored user configuration {}", user_id)?;
        }
        UserAction::Get { user_id } => {
            print_json(&user_configs.fetch_by_key(&user_id).await?, out)?;
        }
        UserAction::List => {
            print_json(&user_configs.fetch_all().await?, out)?;
        }
        UserAction::Delete { user_id } => {
            user_configs.delete(&user_id).await?;
            writeln!(out, "deleted user configuration {}", user_id)?;
        }
    }
    Ok(())
}

async fn export(args: ExportArgs, db: &MuundoDb, out: &mut impl Write) -> CliResult<()> {
    if args.stdout {
        writeln!(out, "{}", db.transfer().export_json().await?)?;
    } else {
        let path = db.transfer().write_export_file(&args.out_dir).await?;
        writeln!(out, "exported to {}", path.display())?;
    }
    Ok(())
}

async fn serve(args: ServeArgs) -> CliResult<()> {
    let mut config = ProxyConfig::for_origin(&args.origin)?;
    if points_at_listener(&config.origin, args.listen) {
        return Err(format!(
            "origin {} is the listen address {}; the proxy would fetch from itself",
            config.origin, args.listen
        )
        .into());
    }
    config.cache_name = args.cache_name;
    config.fetch_timeout = Duration::from_secs(args.timeout_secs);

    let loader = LoaderState::new();
    loader.mark_template_loaded();
    loader.on_models_loaded(|| info!("{} App shell ready", prefix::LOADER));

    let proxy = AssetProxy::with_http(config);
    if args.skip_install {
        warn!("{} Skipping install, app shell not cached", prefix::SERVICE_WORKER);
    } else {
        proxy.install().await?;
        loader.notify_models_loaded();
    }

    let listener = TcpListener::bind(args.listen).await?;
    info!(
        "{} Serving {} on http://{}",
        prefix::SERVICE_WORKER,
        proxy.config().origin,
        args.listen
    );

    axum::serve(listener, router(proxy))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("{} Shutdown complete", prefix::SERVICE_WORKER);
    Ok(())
}

/// True if requests to `origin` would arrive back on `listen`.
fn points_at_listener(origin: &Url, listen: SocketAddr) -> bool {
    if origin.port_or_known_default() != Some(listen.port()) {
        return false;
    }

    let listen_ip = listen.ip();
    let origin_ip = match origin.host() {
        Some(Host::Domain(domain)) if domain.eq_ignore_ascii_case("localhost") => {
            return listen_ip.is_loopback() || listen_ip.is_unspecified();
        }
        Some(Host::Ipv4(ip)) => IpAddr::V4(ip),
        Some(Host::Ipv6(ip)) => IpAddr::V6(ip),
        Some(Host::Domain(_)) | None => return false,
    };

    listen_ip.is_unspecified()
        || origin_ip == listen_ip
        || (origin_ip.is_loopback() && listen_ip.is_loopback())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
