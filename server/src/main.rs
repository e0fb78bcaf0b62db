use anyhow::Result;
use axum::Router;
use clap::Parser;
use okapi_core::Bm25Params;
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};
use server::build_app;
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Corpus file to index at startup
    #[arg(long, default_value = "./corpus.txt")]
    corpus: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[arg(long, default_value_t = 1.2)]
    k1: f64,
    #[arg(long, default_value_t = 100.0)]
    k2: f64,
    #[arg(long, default_value_t = 0.75)]
    b: f64,
    /// Indexing threads (0 = rayon's default pool)
    #[arg(long, default_value_t = 0)]
    workers: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let params = Bm25Params { k1: args.k1, k2: args.k2, b: args.b };
    let app: Router = build_app(&args.corpus, params, args.workers)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
