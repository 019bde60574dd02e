use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tracing::{info, warn};

use crate::batch::page_is_invalid;
use crate::error::{OathError, Result};
use crate::settings::Settings;

// The details page ignores the filters but 500s without them.
const QUERY_TAIL: &str = "&referenceTypeID=&authorIDName=&workID=0&workCategory=&workGenre=&takenStateID=0&Fictional=U&markerID=&sanctifyingCircumstances=N&oathDate=&invokedGodID=0&swearerID=0&sweareeID=0&swearerStateID=0&sweareeStateID=0&swearerStatus=&sweareeStatus=&swearerAgeClass=&sweareeAgeClass=&swearerGenderID=&sweareeGenderID=&centuryID=0&Taken=U&Fulfilled=U";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FetchStats {
    pub total: usize,
    pub fetched: usize,
    pub cached: usize,
    pub failed: usize,
}

pub fn page_url(settings: &Settings, oath_id: u32) -> String {
    format!("{}?oathID={}{}", settings.base_url, oath_id, QUERY_TAIL)
}

pub fn cache_path(dir: &Path, oath_id: u32) -> PathBuf {
    dir.join(format!("{}.html", oath_id))
}

/// Download oaths `start..=end` into `dir`, one page at a time, skipping
/// pages already on disk.
pub async fn fetch_range(settings: &Settings, start: u32, end: u32, dir: &Path) -> Result<FetchStats> {
    std::fs::create_dir_all(dir).map_err(|e| OathError::write(dir, e))?;
    let client = Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()
        .map_err(|source| OathError::Http { oath_id: start, source })?;

    let total = end.saturating_sub(start) as usize + usize::from(start <= end);
    let mut stats = FetchStats {
        total,
        ..Default::default()
    };

    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40} {pos}/{len} (eta {eta})")
    {
        pb.set_style(style.progress_chars("=> "));
    }

    for oath_id in start..=end {
        let path = cache_path(dir, oath_id);
        if path.exists() {
            info!("Oath {} already downloaded", oath_id);
            stats.cached += 1;
            pb.inc(1);
            continue;
        }

        match fetch_with_retry(&client, settings, oath_id).await {
            Ok(html) => {
                tokio::fs::write(&path, html)
                    .await
                    .map_err(|e| OathError::write(&path, e))?;
                info!("Downloaded oath {}", oath_id);
                stats.fetched += 1;
            }
            Err(e) => {
                warn!("Giving up on oath {}: {}", oath_id, e);
                stats.failed += 1;
            }
        }
        pb.inc(1);

        if oath_id != end {
            tokio::time::sleep(Duration::from_secs(settings.delay_secs)).await;
        }
    }

    pb.finish_and_clear();
    info!(
        "Fetched {} pages ({} cached, {} failed)",
        stats.fetched, stats.cached, stats.failed
    );
    Ok(stats)
}

async fn fetch_with_retry(client: &Client, settings: &Settings, oath_id: u32) -> Result<String> {
    let mut attempt = 0;
    loop {
        match fetch_one(client, settings, oath_id).await {
            Ok(html) => return Ok(html),
            Err(e) if attempt < settings.max_retries => {
                attempt += 1;
                warn!(
                    "Oath {} (attempt {}/{}): {}, backing off {}s",
                    oath_id, attempt, settings.max_retries, e, settings.invalid_backoff_secs
                );
                tokio::time::sleep(Duration::from_secs(settings.invalid_backoff_secs)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn fetch_one(client: &Client, settings: &Settings, oath_id: u32) -> Result<String> {
    let http = |source| OathError::Http { oath_id, source };
    let html = client
        .get(page_url(settings, oath_id))
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(http)?
        .text()
        .await
        .map_err(http)?;

    if page_is_invalid(&html) {
        return Err(OathError::InvalidPage { oath_id });
    }
    Ok(html)
}
