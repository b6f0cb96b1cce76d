use actix_web::middleware::{Condition, Logger};
use actix_web::{web, App, HttpServer};
use clap::Parser;
use env_logger::Env;
use std::sync::Arc;

use launch_schedule::cache::LaunchCache;
use launch_schedule::ready::ready_signal;
use launch_schedule::scheduler::refresh_periodically;
use launch_schedule::spaceflightnow::{build_client, scrape_once};
use launch_schedule::{routes, AppState, Args};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let address = format!("{}:{}", args.ip, args.port);
    let interval = args.refresh_interval();

    let client = build_client(args.fetch_timeout()).map_err(|e| {
        log::error!("Failed to build HTTP client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, "HTTP client initialization failed")
    })?;

    let cache = Arc::new(LaunchCache::new(interval));
    let (notifier, ready) = ready_signal();

    let url = args.url.clone();
    tokio::spawn(refresh_periodically(cache.clone(), notifier, move || {
        let client = client.clone();
        let url = url.clone();
        async move { scrape_once(&client, &url).await }
    }));

    // Don't serve until the cache holds real data.
    if !ready.is_ready() {
        log::info!("Waiting for initial launch data from {}", args.url);
    }
    ready.wait().await.map_err(|_| {
        log::error!("Refresh task stopped before loading any launches");
        std::io::Error::new(std::io::ErrorKind::Other, "Initial refresh failed")
    })?;

    let log_requests = args.log_requests;
    let app_state = web::Data::new(AppState { cache });

    log::info!("Server running at http://{}", address);
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(Condition::new(log_requests, Logger::new("%a %U %s")))
            .configure(routes)
    })
    .bind(&address)?
    .run()
    .await
}
