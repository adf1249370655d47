//! A single-node group with no peers: a loader backs every miss, a hit
//! serves straight from the byte-budgeted cache.

use geecache::byte_view::ByteView;
use geecache::error::CacheError;
use geecache::group::Group;
use std::collections::HashMap;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let scores = HashMap::from([
        ("Tom".to_string(), "630".to_string()),
        ("Jack".to_string(), "589".to_string()),
        ("Sam".to_string(), "567".to_string()),
    ]);

    let loader = move |key: String| {
        let scores = scores.clone();
        async move {
            println!("[SlowDB] searching key {key}");
            scores
                .get(&key)
                .map(|v| ByteView::new(v.as_bytes()))
                .ok_or_else(|| CacheError::NotFound(key))
        }
    };

    let group = Group::new("scores", 2 << 10, Arc::new(loader));

    for key in ["Tom", "Jack", "Tom", "unknown"] {
        match group.get(key).await {
            Ok(view) => println!("{key} => {}", view.as_str()),
            Err(e) => println!("{key} => error: {e}"),
        }
    }

    println!("metrics: {:?}", group.metrics());
}
