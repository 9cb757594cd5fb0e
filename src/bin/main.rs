use actix_web::{web, App, HttpServer};
use anyhow::Context as _;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Mutex;
use blog::config::{BIND_ADDR_ENV, DATA_FILE_ENV, DEFAULT_BIND_ADDR, DEFAULT_DATA_FILE};
use blog::core::storage::Storage;
use blog::handlers;

/// Minimal blog backend serving users and posts from a JSON file
#[derive(Parser, Debug)]
#[command(name = "blog")]
#[command(version)]
struct Cli {
    /// Address to listen on
    #[arg(short, long, env = BIND_ADDR_ENV, default_value = DEFAULT_BIND_ADDR)]
    bind: String,

    /// Snapshot file holding all users and posts
    #[arg(short, long, env = DATA_FILE_ENV, default_value = DEFAULT_DATA_FILE)]
    data_file: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .init();

    let storage = Storage::open(&cli.data_file)
        .with_context(|| format!("opening {}", cli.data_file.display()))?;
    tracing::info!(
        path = %storage.path().display(),
        next_user_id = storage.next_user_id(),
        next_post_id = storage.next_post_id(),
        "storage ready"
    );
    let storage = web::Data::new(Mutex::new(storage));

    tracing::info!("Server listening on http://{}", cli.bind);
    HttpServer::new(move || {
        App::new()
            .app_data(storage.clone())
            .configure(handlers::configure)
    })
    .bind(&cli.bind)
    .with_context(|| format!("binding {}", cli.bind))?
    .run()
    .await?;

    Ok(())
}
