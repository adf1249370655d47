//! Standalone cache node. Recovered from
//! `original_source/geecache/main.go`'s `createGroup`/`startCacheServer`/
//! `startAPIServer` trio: one process can either serve peer traffic
//! (`--port`) or double as a public-facing API front-end (`--api`) that
//! proxies into the same in-process `Group`.

use clap::Parser;
use geecache::config::PoolConfig;
use geecache::error::CacheError;
use geecache::group::Group;
use geecache::peer::Loader;
use geecache::pool::PeerPool;
use geecache::ByteView;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(about = "Run one node of a distributed geecache cluster")]
struct Args {
    /// Port this node's peer server listens on.
    #[arg(long, default_value_t = 8001)]
    port: u16,

    /// Also start a public-facing API server on :9999 that proxies reads
    /// into the local group.
    #[arg(long)]
    api: bool,

    /// Addresses of every peer in the cluster, including this node's own.
    /// Repeat the flag or comma-separate: `--peers 127.0.0.1:8001,127.0.0.1:8002`.
    #[arg(long, value_delimiter = ',', default_values_t = [
        "http://127.0.0.1:8001".to_string(),
        "http://127.0.0.1:8002".to_string(),
        "http://127.0.0.1:8003".to_string(),
    ])]
    peers: Vec<String>,
}

/// A loader backed by an in-memory map, standing in for the "scores"
/// example from the original program.
struct StaticLoader {
    data: HashMap<String, String>,
}

#[async_trait::async_trait]
impl Loader for StaticLoader {
    async fn load(&self, key: &str) -> Result<ByteView, CacheError> {
        tracing::info!(key, "[SlowDB] searching key");
        match self.data.get(key) {
            Some(v) => Ok(ByteView::new(v.as_bytes())),
            None => Err(CacheError::NotFound(key.to_string())),
        }
    }
}

fn create_group() -> Arc<Group> {
    let data = HashMap::from([
        ("Tom".to_string(), "630".to_string()),
        ("Jack".to_string(), "589".to_string()),
        ("Sam".to_string(), "567".to_string()),
    ]);
    Group::new("scores", 2 << 10, Arc::new(StaticLoader { data }))
}

async fn start_cache_server(self_addr: &str, peers: &[String], group: Arc<Group>) -> anyhow::Result<()> {
    let mut cfg = PoolConfig::new(self_addr);
    cfg.peers = peers.to_vec();
    let pool = PeerPool::new(cfg)?;
    group
        .register_peers(pool.clone())
        .map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(addr = self_addr, "geecache is running at");
    let listener = tokio::net::TcpListener::bind(self_addr.trim_start_matches("http://")).await?;
    axum::serve(listener, PeerPool::router(&pool)).await?;
    Ok(())
}

async fn start_api_server(api_addr: &str, group: Arc<Group>) -> anyhow::Result<()> {
    use axum::extract::{Query, State};
    use axum::routing::get;

    async fn handle(
        State(group): State<Arc<Group>>,
        Query(params): Query<HashMap<String, String>>,
    ) -> axum::response::Response {
        use axum::http::StatusCode;
        use axum::response::IntoResponse;

        let Some(key) = params.get("key") else {
            return (StatusCode::BAD_REQUEST, "missing key").into_response();
        };
        match group.get(key).await {
            Ok(view) => (
                StatusCode::OK,
                [(axum::http::header::CONTENT_TYPE, "application/octet-stream")],
                view.as_bytes(),
            )
                .into_response(),
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        }
    }

    let router = axum::Router::new()
        .route("/api", get(handle))
        .with_state(group);

    tracing::info!(addr = api_addr, "frontend server is running at");
    let listener = tokio::net::TcpListener::bind(api_addr.trim_start_matches("http://")).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let self_addr = format!("http://127.0.0.1:{}", args.port);
    let group = create_group();

    if args.api {
        let group_for_api = group.clone();
        let peers = args.peers.clone();
        let cache_addr = self_addr.clone();
        tokio::spawn(async move {
            if let Err(e) = start_cache_server(&cache_addr, &peers, group).await {
                tracing::error!(error = %e, "cache server exited");
            }
        });
        start_api_server("http://127.0.0.1:9999", group_for_api).await?;
    } else {
        start_cache_server(&self_addr, &args.peers, group).await?;
    }

    Ok(())
}
