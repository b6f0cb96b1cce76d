use reqwest::StatusCode;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use launch_schedule::error::FetchError;
use launch_schedule::spaceflightnow::{build_client, fetch_page, scrape_once};

const FIXTURE: &str = include_str!("fixtures/schedule.html");

/// Serves a single canned HTTP response and returns the URL to request.
async fn serve_once(status_line: &str, body: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await.unwrap();
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    format!("http://{addr}/launch-schedule/")
}

fn client() -> reqwest::Client {
    build_client(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn scrapes_served_page() {
    let url = serve_once("200 OK", FIXTURE).await;

    let launches = scrape_once(&client(), &url).await.unwrap();

    assert_eq!(launches.len(), 1);
    assert_eq!(launches[0].site, "SLC-40, Cape Canaveral SFS, Florida");
}

#[tokio::test]
async fn non_success_status_is_a_fetch_error() {
    let url = serve_once("503 Service Unavailable", "down for maintenance").await;

    let err = fetch_page(&client(), &url).await.unwrap_err();

    assert!(matches!(err, FetchError::Status(StatusCode::SERVICE_UNAVAILABLE)));
}

#[tokio::test]
async fn connection_refused_is_a_fetch_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = scrape_once(&client(), &format!("http://{addr}/"))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Request(_)));
}

#[tokio::test]
async fn unresponsive_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        // Accept and hold the connection without ever answering.
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let client = build_client(Duration::from_millis(200)).unwrap();
    let started = Instant::now();
    let err = fetch_page(&client, &format!("http://{addr}/"))
        .await
        .unwrap_err();

    assert!(matches!(&err, FetchError::Request(e) if e.is_timeout()));
    assert!(started.elapsed() < Duration::from_secs(5));
}
