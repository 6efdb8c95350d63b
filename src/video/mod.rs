use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use reqwest::Client;

use crate::config::WechatConfig;
use crate::output::types::Meta;
use crate::telemetry::{self};

mod adapter;
mod error;
mod feed;
mod transform;
mod types;

pub use adapter::ProfileVideoAdapter;
pub use error::VideoError;
pub use feed::FeedRequest;

/// wxfeed video <username>
#[derive(Args, Debug)]
pub struct VideoCmd {
    /// Author username, e.g. v2_xxx@finder
    pub username: String,
    /// Pagination cursor returned by a previous page
    #[arg(long, default_value = "")]
    pub next_marker: String,
    #[arg(long)] pub token: Option<String>,
    #[arg(long)] pub base_url: Option<String>,
    #[arg(long)] pub timeout_secs: Option<u64>,
}

pub async fn run(args: VideoCmd) -> Result<()> {
    let log = telemetry::video();
    let _g = log.root_span_kv([
        ("username", args.username.clone()),
        ("next_marker", args.next_marker.clone()),
        ("json", telemetry::config::json_mode().to_string()),
    ]).entered();
    let t0 = Instant::now();

    let mut cfg = WechatConfig::from_env();
    if let Some(token) = args.token { cfg = cfg.with_token(token); }
    if let Some(base) = args.base_url { cfg = cfg.with_base_url(base); }
    if let Some(secs) = args.timeout_secs { cfg.timeout = Duration::from_secs(secs); }
    log.debug(format!("upstream={} timeout={:?}", cfg.base_url, cfg.timeout));

    let http = Client::builder()
        .timeout(cfg.timeout)
        .build()
        .context("build http client")?;

    let adapter = ProfileVideoAdapter::new(cfg);
    let req = FeedRequest::new(args.username).with_cursor(args.next_marker);
    let page = adapter
        .fetch_profile_page(&http, &req)
        .await
        .with_context(|| format!("fetch videos for {}", req.username))?;

    if telemetry::config::json_mode() {
        let meta = Meta { duration_ms: Some(t0.elapsed().as_millis()) };
        log.result(&page, Some(meta))?;
    } else {
        log.info(format!("📺 {} — {}", page.feed.title, page.feed.link));
        for item in &page.feed.items {
            log.info_kv(
                &format!("  [{}] {} ({})", item.guid, item.title, item.pub_date),
                [("link", item.link.clone())],
            );
        }
        if let Some(marker) = &page.next_marker {
            log.info(format!("   more available: --next-marker {}", marker));
        }
    }
    Ok(())
}
