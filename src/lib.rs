use actix_web::{get, route, web, HttpResponse, Responder};
use clap::{ArgAction, Parser};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

pub mod cache;
pub mod duration;
pub mod error;
pub mod page;
pub mod ready;
pub mod scheduler;
pub mod spaceflightnow;

use cache::LaunchCache;
use duration::{format_eastern, format_hms, parse_duration};
use spaceflightnow::{Launch, SITE_URL};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(4 * 60 * 60);

#[derive(Parser, Debug)]
#[clap(about, version)]
pub struct Args {
    #[clap(short, long, env = "HTTP_IP", default_value = "0.0.0.0")]
    pub ip: String,

    #[clap(short, long, env = "HTTP_PORT", default_value = "8080")]
    pub port: u16,

    /// Log every request. Only the value "true" enables it.
    #[clap(short, long, env = "LOG_REQUESTS", default_value = "false", value_parser = parse_flag, action = ArgAction::Set)]
    pub log_requests: bool,

    /// Refresh interval, e.g. "4h", "90m" or "1h30m".
    #[clap(short, long, env = "REFRESH")]
    pub refresh: Option<String>,

    #[clap(short, long, env = "SCHEDULE_URL", default_value = SITE_URL)]
    pub url: String,

    /// Network timeout for fetching the schedule page, in seconds.
    #[clap(short, long, env = "FETCH_TIMEOUT", default_value = "30")]
    pub timeout: u64,
}

fn parse_flag(value: &str) -> Result<bool, Infallible> {
    Ok(value == "true")
}

impl Args {
    /// The configured refresh interval, or the default when it is missing or invalid.
    pub fn refresh_interval(&self) -> Duration {
        match self.refresh.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_REFRESH_INTERVAL,
            Some(value) => match parse_duration(value) {
                Ok(interval) => interval,
                Err(err) => {
                    log::warn!("Invalid refresh interval ({err}). Using default.");
                    DEFAULT_REFRESH_INTERVAL
                }
            },
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

pub struct AppState {
    pub cache: Arc<LaunchCache>,
}

#[route("/", method = "GET", method = "HEAD")]
async fn index(app_data: web::Data<AppState>) -> impl Responder {
    let cache = &app_data.cache;
    let launches = cache.current().await;
    let time_remaining = format_hms(cache.time_until_next_refresh().await);
    let last_refresh = cache
        .last_refresh()
        .await
        .map(format_eastern)
        .unwrap_or_else(|| "never".to_string());

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(page::render_index(&launches, &time_remaining, &last_refresh))
}

#[get("/style.css")]
async fn style() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/css")
        .body(page::STYLE_CSS)
}

#[get("/api/launches")]
async fn launches_json(app_data: web::Data<AppState>) -> impl Responder {
    let cache = &app_data.cache;
    let launches = cache.current().await;
    let remaining = cache.time_until_next_refresh().await;

    HttpResponse::Ok().json(json!({
        "launches": launches.iter().map(Launch::to_json).collect::<Vec<_>>(),
        "next_refresh_in": format_hms(remaining),
        "next_refresh_secs": remaining.as_secs(),
    }))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index).service(style).service(launches_json);
}
