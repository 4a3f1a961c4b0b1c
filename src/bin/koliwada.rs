use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use koliwada::config::Overrides;
use koliwada::store::{FileStore, MemoryStore, ProfileStore};
use koliwada::{ConfigLoader, Router, api, module, server};
use tracing_subscriber::EnvFilter;

/// Session gateway for the koliwada admin portal.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML config file.
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    /// Session token secret, at least 32 bytes. Prefer KOLIWADA_JWT_SECRET.
    #[arg(long)]
    jwt_secret: Option<String>,

    /// Keep admin profiles in this directory instead of memory.
    #[arg(long)]
    store_dir: Option<PathBuf>,
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[tokio::main]
async fn main() -> koliwada::Result<()> {
    setup_logging();
    let args = Args::parse();

    let config = ConfigLoader::default().load(
        args.config.as_deref(),
        Overrides {
            host: args.host.as_deref(),
            port: args.port,
            jwt_secret: args.jwt_secret.as_deref(),
            store_dir: args.store_dir.as_deref(),
        },
    )?;

    let store: Arc<dyn ProfileStore> = match &config.session.store_dir {
        Some(dir) => Arc::new(FileStore::open(dir)?),
        None => {
            tracing::info!("using in-memory profile store");
            Arc::new(MemoryStore::new())
        }
    };

    let mut router = Router::new();
    module::register(&mut router, &api::modules());

    server::run(config, store, router.into_handle()).await
}
