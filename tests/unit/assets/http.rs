use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use super::*;

const BADGE: &str = r#"{"size": {"width": 2, "height": 3}}"#;

type Hits = Arc<Mutex<Vec<String>>>;

/// Serve fixed responses keyed by request path on a loopback port. Unknown paths get a 404.
async fn serve(routes: Vec<(&'static str, Vec<u8>)>) -> (String, Hits) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let hits: Hits = Arc::default();

    let seen = Arc::clone(&hits);
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let head = String::from_utf8_lossy(&request);
            let path = head.split_whitespace().nth(1).unwrap_or("").to_owned();
            seen.lock().unwrap().push(path.clone());

            let (status, body) = match routes.iter().find(|(p, _)| *p == path) {
                Some((_, body)) => ("200 OK", body.clone()),
                None => ("404 Not Found", b"missing".to_vec()),
            };
            let header = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(header.as_bytes()).await;
            let _ = stream.write_all(&body).await;
            let _ = stream.shutdown().await;
        }
    });

    (base, hits)
}

fn fetcher(registry_url: &str, cache_dir: Option<PathBuf>) -> HttpFetcher {
    // Loopback requests must not go through a proxy picked up from the environment.
    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    HttpFetcher {
        client,
        local: FsFetcher::new(FsFetcherOpts {
            root: None,
            cache_dir,
        }),
        registry_url: registry_url.trim_end_matches('/').to_owned(),
    }
}

fn badge() -> CompositionRef {
    CompositionRef::parse("badge").unwrap()
}

#[test]
fn opts_default_to_no_cache_and_a_thirty_second_timeout() {
    let opts = HttpFetcherOpts::new("https://registry.example/");
    assert!(opts.cache_dir.is_none());
    assert!(opts.root.is_none());
    assert_eq!(opts.timeout, Duration::from_secs(30));

    let f = HttpFetcher::new(opts).unwrap();
    assert_eq!(f.registry_url, "https://registry.example");
}

#[tokio::test]
async fn cached_compositions_never_reach_the_registry() {
    let (base, hits) = serve(Vec::new()).await;
    let dir = tempfile::tempdir().unwrap();
    let comp_dir = dir.path().join("compositions").join("badge");
    std::fs::create_dir_all(&comp_dir).unwrap();
    std::fs::write(comp_dir.join("latest.json"), BADGE).unwrap();

    let f = fetcher(&base, Some(dir.path().to_path_buf()));
    let c = f.fetch_composition(&badge()).await.unwrap();
    assert_eq!((c.size.width, c.size.height), (2, 3));
    assert!(hits.lock().unwrap().is_empty());
}

#[tokio::test]
async fn registry_compositions_are_written_back_to_the_cache() {
    let routes = vec![("/compositions/badge/latest", BADGE.as_bytes().to_vec())];
    let (base, hits) = serve(routes).await;
    let dir = tempfile::tempdir().unwrap();

    let f = fetcher(&format!("{base}/"), Some(dir.path().to_path_buf()));
    let c = f.fetch_composition(&badge()).await.unwrap();
    assert_eq!((c.size.width, c.size.height), (2, 3));
    assert_eq!(*hits.lock().unwrap(), vec!["/compositions/badge/latest".to_owned()]);

    let cached = dir.path().join("compositions").join("badge").join("latest.json");
    assert_eq!(std::fs::read_to_string(cached).unwrap(), BADGE);

    // Second lookup is served from the cache.
    f.fetch_composition(&badge()).await.unwrap();
    assert_eq!(hits.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn registry_works_without_a_cache_dir() {
    let routes = vec![("/compositions/team/badge/1.0", BADGE.as_bytes().to_vec())];
    let (base, hits) = serve(routes).await;

    let f = fetcher(&base, None);
    let reference = CompositionRef::parse("team/badge:1.0").unwrap();
    let c = f.fetch_composition(&reference).await.unwrap();
    assert_eq!(c.size.height, 3);
    assert_eq!(hits.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn registry_miss_is_an_unresolved_reference() {
    let (base, hits) = serve(Vec::new()).await;
    let dir = tempfile::tempdir().unwrap();

    let f = fetcher(&base, Some(dir.path().to_path_buf()));
    let err = f.fetch_composition(&badge()).await.unwrap_err();
    assert!(matches!(err, LaminateError::UnresolvedReference(_)), "{err}");
    assert_eq!(hits.lock().unwrap().len(), 1);
    assert!(!dir.path().join("compositions").exists());
}

#[tokio::test]
async fn remote_images_are_fetched_over_http() {
    let (base, hits) = serve(vec![("/img/logo.png", vec![9u8, 8, 7])]).await;

    let f = fetcher("http://registry.invalid", None);
    let bytes = f.fetch_image(&format!("{base}/img/logo.png")).await.unwrap();
    assert_eq!(bytes, vec![9, 8, 7]);
    assert_eq!(*hits.lock().unwrap(), vec!["/img/logo.png".to_owned()]);

    let err = f.fetch_image(&format!("{base}/img/gone.png")).await.unwrap_err();
    assert!(matches!(err, LaminateError::UnresolvedReference(_)), "{err}");
}

#[tokio::test]
async fn local_images_are_read_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("img.bin");
    std::fs::write(&path, [1u8, 2, 3]).unwrap();

    let f = fetcher("http://registry.invalid", None);
    let bytes = f.fetch_image(path.to_str().unwrap()).await.unwrap();
    assert_eq!(bytes, vec![1, 2, 3]);
}
