//! Fetcher retry, proxy fallback and composite retrieval tests against a
//! local mock HTTP listener.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use panelboard_core::{SheetError, SheetsConfig, SheetsFetcher};

/// Spawn a listener that answers every request using `respond`, which maps
/// the request head (first line included) to a status line and body.
async fn spawn_http<F>(hits: Arc<AtomicUsize>, respond: F) -> String
where
    F: Fn(&str) -> (&'static str, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            hits.fetch_add(1, Ordering::SeqCst);

            let mut buf = vec![0u8; 8192];
            let n = stream.read(&mut buf).await.unwrap_or(0);
            let head = String::from_utf8_lossy(&buf[..n]).to_string();

            let (status, body) = respond(&head);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    format!("http://{}", addr)
}

async fn spawn_ok_csv(hits: Arc<AtomicUsize>, csv: &'static str) -> String {
    spawn_http(hits, move |_| ("200 OK", csv.to_string())).await
}

async fn spawn_failing(hits: Arc<AtomicUsize>) -> String {
    spawn_http(hits, |_| ("500 Internal Server Error", String::new())).await
}

fn config(base_url: String, proxy_url: String) -> SheetsConfig {
    SheetsConfig {
        document_id: Some("test-doc".to_string()),
        base_url: Some(base_url),
        proxy_url: Some(proxy_url),
        timeout_ms: 2_000,
        max_attempts: 2,
        retry_base_delay_ms: 100,
        ..Default::default()
    }
}

#[tokio::test]
async fn direct_fetch_succeeds_without_touching_proxy() {
    let direct_hits = Arc::new(AtomicUsize::new(0));
    let proxy_hits = Arc::new(AtomicUsize::new(0));

    let base = spawn_ok_csv(direct_hits.clone(), "Name,Status\nAlice,ongoing\n").await;
    let proxy = spawn_failing(proxy_hits.clone()).await;

    let fetcher = SheetsFetcher::new(config(base, proxy)).unwrap();
    let rows = fetcher.fetch_sheet("round1", None).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("Name"), Some("Alice"));
    assert_eq!(direct_hits.load(Ordering::SeqCst), 1);
    assert_eq!(proxy_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn proxy_fallback_rescues_failed_direct_request_within_one_attempt() {
    let direct_hits = Arc::new(AtomicUsize::new(0));
    let proxy_hits = Arc::new(AtomicUsize::new(0));

    let base = spawn_failing(direct_hits.clone()).await;
    let proxy = spawn_ok_csv(proxy_hits.clone(), "Name,Status\nBob,pending\n").await;

    let fetcher = SheetsFetcher::new(config(base, proxy)).unwrap();
    let started = Instant::now();
    let rows = fetcher.fetch_sheet("round1", None).await.unwrap();

    assert_eq!(rows[0].get("Name"), Some("Bob"));
    assert_eq!(direct_hits.load(Ordering::SeqCst), 1);
    assert_eq!(proxy_hits.load(Ordering::SeqCst), 1);
    // Rescued within the first attempt: no backoff wait.
    assert!(started.elapsed() < Duration::from_millis(100));
}

#[tokio::test]
async fn exhausted_attempts_fail_with_sheet_and_attempt_count() {
    let direct_hits = Arc::new(AtomicUsize::new(0));
    let proxy_hits = Arc::new(AtomicUsize::new(0));

    let base = spawn_failing(direct_hits.clone()).await;
    let proxy = spawn_failing(proxy_hits.clone()).await;

    let fetcher = SheetsFetcher::new(config(base, proxy)).unwrap();
    let started = Instant::now();
    let result = fetcher.fetch_sheet("round1", None).await;

    match result {
        Err(SheetError::FetchFailed {
            sheet, attempts, ..
        }) => {
            assert_eq!(sheet, "round1");
            assert_eq!(attempts, 2);
        }
        other => panic!("expected FetchFailed, got {:?}", other),
    }

    // Both routes tried on both attempts, with exactly one backoff between.
    assert_eq!(direct_hits.load(Ordering::SeqCst), 2);
    assert_eq!(proxy_hits.load(Ordering::SeqCst), 2);
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn timed_out_direct_request_falls_through_to_proxy() {
    // A listener that accepts and then never responds.
    let black_hole = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let _ = stream.read(&mut buf).await;
                    tokio::time::sleep(Duration::from_secs(60)).await;
                });
            }
        });
        format!("http://{}", addr)
    };

    let proxy_hits = Arc::new(AtomicUsize::new(0));
    let proxy = spawn_ok_csv(proxy_hits.clone(), "Name,Status\nCarol,done\n").await;

    let mut cfg = config(black_hole, proxy);
    cfg.timeout_ms = 300;
    let fetcher = SheetsFetcher::new(cfg).unwrap();

    let rows = fetcher.fetch_sheet("round1", None).await.unwrap();
    assert_eq!(rows[0].get("Name"), Some("Carol"));
    assert_eq!(proxy_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn composite_retrieval_falls_back_to_filtered_combined_sheet() {
    const COMBINED_CSV: &str = "\
Name,Round 1 Panel,Status
a,Panel X,pending
b,,done
c,Panel Y,ongoing
d,Panel X,done
e,,pending
";

    let hits = Arc::new(AtomicUsize::new(0));
    // Named sheets 404; the default sheet (empty sheet param) serves the
    // combined CSV.
    let base = spawn_http(hits.clone(), |head| {
        if head.contains("sheet=round1") || head.contains("sheet=round2") {
            ("404 Not Found", String::new())
        } else {
            ("200 OK", COMBINED_CSV.to_string())
        }
    })
    .await;
    let proxy_hits = Arc::new(AtomicUsize::new(0));
    let proxy = spawn_failing(proxy_hits.clone()).await;

    let mut cfg = config(base, proxy);
    cfg.max_attempts = 1;
    let fetcher = SheetsFetcher::new(cfg).unwrap();

    let data = fetcher.fetch_rounds().await.unwrap();

    // Exactly the three rows with a non-empty "Round 1 Panel", in combined
    // sheet order.
    let names: Vec<_> = data.round1.iter().filter_map(|r| r.get("Name")).collect();
    assert_eq!(names, vec!["a", "c", "d"]);

    // No round-2 panel column anywhere: empty round, not an error.
    assert!(data.round2.is_empty());
}

#[tokio::test]
async fn composite_retrieval_uses_named_sheets_when_available() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = spawn_http(hits.clone(), |head| {
        if head.contains("sheet=round1") {
            ("200 OK", "Name,Round 1 Panel,Status\nr1,Panel A,ongoing\n".to_string())
        } else if head.contains("sheet=round2") {
            (
                "200 OK",
                "Name,Panelist Name - Room,Status\nr2,Room 1,pending\n".to_string(),
            )
        } else {
            ("404 Not Found", String::new())
        }
    })
    .await;
    let proxy_hits = Arc::new(AtomicUsize::new(0));
    let proxy = spawn_failing(proxy_hits.clone()).await;

    let fetcher = SheetsFetcher::new(config(base, proxy)).unwrap();
    let data = fetcher.fetch_rounds().await.unwrap();

    assert_eq!(data.round1.len(), 1);
    assert_eq!(data.round2.len(), 1);
    // Round-2 rows are normalized: canonical columns always present.
    assert_eq!(data.round2[0].get("Email"), Some(""));
    assert_eq!(data.round2[0].get("Panelist Name - Room"), Some("Room 1"));
}
