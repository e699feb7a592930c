use super::*;

fn raster(w: u32) -> Arc<Raster> {
    Arc::new(Raster::new(w, 1).unwrap())
}

#[test]
fn insert_get_and_flush() {
    let cache = AssetCache::new();
    assert!(cache.is_empty());
    assert!(cache.get("a.png").is_none());

    cache.insert("a.png", raster(2));
    assert!(cache.contains("a.png"));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("a.png").unwrap().width, 2);

    cache.flush();
    assert!(cache.is_empty());
    assert!(!cache.contains("a.png"));
}

#[test]
fn last_writer_wins() {
    let cache = AssetCache::new();
    cache.insert("a.png", raster(1));
    cache.insert("a.png", raster(3));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("a.png").unwrap().width, 3);
}

#[test]
fn shared_across_threads() {
    let cache = Arc::new(AssetCache::new());
    let handles: Vec<_> = (0..4u32)
        .map(|i| {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                cache.insert("same", raster(i + 1));
                cache.insert(format!("own-{i}"), raster(1));
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(cache.len(), 5);
    assert!(cache.get("same").is_some());
}
