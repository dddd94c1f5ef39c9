use anyhow::Result;
use axum::Router;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};
use warta_core::{EngineConfig, Language};
use warta_server::build_app;

#[derive(Parser)]
struct Args {
    /// Scraped articles (JSON/JSONL file or directory) used when no snapshot exists
    #[arg(long, default_value = "articles.json")]
    source: PathBuf,
    /// Model snapshot path
    #[arg(long, default_value = "model/snapshot.bin")]
    snapshot: PathBuf,
    #[arg(long, default_value_t = Language::Indonesian)]
    language: Language,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = EngineConfig { source: args.source, snapshot: args.snapshot, language: args.language };
    // model loading is blocking work; finish it before binding
    let app: Router = tokio::task::spawn_blocking(move || build_app(config)).await??;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
