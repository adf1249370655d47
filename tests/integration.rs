//! End-to-end scenarios spanning `Group`, the byte-budgeted cache, single
//! flight coalescing, and the HTTP peer transport together, rather than
//! exercising any one module in isolation.

use async_trait::async_trait;
use geecache::config::PoolConfig;
use geecache::error::CacheError;
use geecache::group::Group;
use geecache::peer::{Loader, PeerClient, PeerPicker};
use geecache::pool::PeerPool;
use geecache::ByteView;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct MapLoader {
    data: HashMap<String, String>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Loader for MapLoader {
    async fn load(&self, key: &str) -> Result<ByteView, CacheError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.data.get(key) {
            Some(v) => Ok(ByteView::new(v.as_bytes())),
            None => Err(CacheError::NotFound(key.to_string())),
        }
    }
}

/// Starts a real HTTP server backing `group`, bound to `self_addr`, with no
/// peers of its own (it only ever answers locally).
async fn spawn_server_node(self_addr: &str, group: &Arc<Group>) {
    let cfg = PoolConfig::new(self_addr);
    let pool = PeerPool::new(cfg).unwrap();
    group.register_peers(pool.clone()).unwrap();

    let listener = tokio::net::TcpListener::bind(self_addr.trim_start_matches("http://"))
        .await
        .unwrap();
    let router = PeerPool::router(&pool);
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    // Give the listener a moment to start accepting.
    tokio::time::sleep(Duration::from_millis(20)).await;
}

#[tokio::test]
async fn miss_then_cached_hit_end_to_end() {
    let data = HashMap::from([("Tom".to_string(), "630".to_string())]);
    let calls = Arc::new(AtomicUsize::new(0));
    let group = Group::new("scores-e2e-hit", 1 << 20, Arc::new(MapLoader { data, calls: calls.clone() }));

    let v1 = group.get("Tom").await.unwrap();
    assert_eq!(v1.as_str(), "630");
    let v2 = group.get("Tom").await.unwrap();
    assert_eq!(v2.as_str(), "630");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_key_reports_not_found() {
    let group = Group::new(
        "scores-e2e-missing",
        1 << 20,
        Arc::new(MapLoader {
            data: HashMap::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }),
    );
    let err = group.get("Ghost").await.unwrap_err();
    assert!(err.to_string().contains("not exist"));
}

#[tokio::test]
async fn single_flight_coalesces_concurrent_misses() {
    struct SlowLoader {
        calls: Arc<AtomicUsize>,
    }
    #[async_trait]
    impl Loader for SlowLoader {
        async fn load(&self, key: &str) -> Result<ByteView, CacheError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(30)).await;
            Ok(ByteView::new(format!("{key}-value").as_bytes()))
        }
    }

    let calls = Arc::new(AtomicUsize::new(0));
    let group = Group::new(
        "scores-e2e-singleflight",
        1 << 20,
        Arc::new(SlowLoader { calls: calls.clone() }),
    );

    let start = tokio::time::Instant::now();
    let mut handles = Vec::new();
    for _ in 0..100 {
        let group = group.clone();
        handles.push(tokio::spawn(async move { group.get("hot-key").await }));
    }
    for h in handles {
        assert_eq!(h.await.unwrap().unwrap().as_str(), "hot-key-value");
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(start.elapsed() < Duration::from_millis(200));
}

#[tokio::test]
async fn peer_fallback_fetches_over_http() {
    // A real server node, holding data nobody else has.
    let server_addr = "http://127.0.0.1:18801";
    let data = HashMap::from([("remote-key".to_string(), "remote-value".to_string())]);
    let server_group = Group::new(
        "scores-e2e-peer-wire",
        1 << 20,
        Arc::new(MapLoader {
            data,
            calls: Arc::new(AtomicUsize::new(0)),
        }),
    );
    spawn_server_node(server_addr, &server_group).await;

    // A second, independent client-side pool whose only peer is the server
    // above -- standing in for a second node that has no local copy of
    // `remote-key` and must fetch it from node A over HTTP.
    let mut client_cfg = PoolConfig::new("http://127.0.0.1:0"); // never bound, client-only
    client_cfg.peers = vec![server_addr.to_string()];
    let client_pool = PeerPool::new(client_cfg).unwrap();

    let peer = client_pool
        .pick_peer("remote-key")
        .expect("the only peer in the ring should be picked");
    let value = peer.get("scores-e2e-peer-wire", "remote-key").await.unwrap();
    assert_eq!(value.as_str(), "remote-value");

    let missing = peer.get("scores-e2e-peer-wire", "nope").await.unwrap_err();
    assert!(missing.to_string().contains("not exist") || matches!(missing, CacheError::Peer(_)));
}
