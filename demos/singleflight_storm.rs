//! Fires 50 concurrent requests for the same cold key and shows the
//! loader only runs once.

use geecache::byte_view::ByteView;
use geecache::error::CacheError;
use geecache::group::Group;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() {
    let load_count = Arc::new(AtomicUsize::new(0));
    let load_count2 = load_count.clone();

    let loader = move |key: String| {
        let load_count = load_count2.clone();
        async move {
            load_count.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok::<ByteView, CacheError>(ByteView::new(format!("{key}-value").as_bytes()))
        }
    };

    let group = Group::new("storm", 1 << 20, Arc::new(loader));

    let start = Instant::now();
    let mut handles = Vec::new();
    for _ in 0..50 {
        let group = group.clone();
        handles.push(tokio::spawn(async move { group.get("hot").await.unwrap() }));
    }
    for h in handles {
        h.await.unwrap();
    }

    println!(
        "50 concurrent misses, {} loader call(s), {:?} elapsed",
        load_count.load(Ordering::SeqCst),
        start.elapsed()
    );
}
