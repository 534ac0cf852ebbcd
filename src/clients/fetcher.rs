//! Page fetching and request pacing.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};
use url::Url;

use crate::config::{ScraperConfig, SourceConfig};
use crate::error::{Result, ScrapeError};

/// Retrieves one page body from a catalog site.
///
/// An `Ok` with an empty body is possible; callers treat it the same as a
/// failure.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, host: &str, path: &str, user_agent: &str) -> Result<String>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, host: &str, path: &str, user_agent: &str) -> Result<String> {
        let url = if host.contains("://") {
            format!("{host}{path}")
        } else {
            format!("https://{host}{path}")
        };

        let fetch_error = |reason: String| ScrapeError::Fetch {
            host: host.to_string(),
            path: path.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_error(format!("HTTP {}", response.status())));
        }

        response.text().await.map_err(|e| fetch_error(e.to_string()))
    }
}

/// Enforces a minimum gap between the end of one request and the start of
/// the next.
#[derive(Debug)]
pub struct Pacer {
    delay: Duration,
    last_done: Mutex<Option<Instant>>,
}

impl Pacer {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_done: Mutex::new(None),
        }
    }

    /// Returns immediately for the first request, otherwise sleeps until
    /// `delay` has passed since the previous one finished.
    pub async fn wait(&self) {
        let last_done = *self
            .last_done
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(done) = last_done {
            tokio::time::sleep_until(done + self.delay).await;
        }
    }

    /// Marks the current request as finished, successful or not.
    pub fn done(&self) {
        *self
            .last_done
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
    }
}

/// One catalog site as seen by an adapter: where it lives, who we say we
/// are, and how fast we may ask.
pub struct SiteClient {
    name: &'static str,
    source: SourceConfig,
    fetcher: Arc<dyn PageFetcher>,
    pacer: Pacer,
}

impl SiteClient {
    #[must_use]
    pub fn new(
        name: &'static str,
        source: SourceConfig,
        scraper: &ScraperConfig,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self {
            name,
            source,
            fetcher,
            pacer: Pacer::new(scraper.page_delay()),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn source(&self) -> &SourceConfig {
        &self.source
    }

    /// Fetches a path on the configured host. Failures and empty bodies are
    /// logged and come back as `None`.
    pub async fn get_page(&self, path: &str) -> Option<String> {
        let host = self.source.host.clone();
        self.get(&host, path).await
    }

    /// Fetches a record URL, which may be absolute or relative to the host.
    pub async fn get_url(&self, url: &str) -> Option<String> {
        match split_url(url) {
            Ok(Some((host, path))) => self.get(&host, &path).await,
            Ok(None) => self.get_page(url).await,
            Err(e) => {
                warn!(source = self.name, error = %e, "Skipping unusable record URL");
                None
            }
        }
    }

    async fn get(&self, host: &str, path: &str) -> Option<String> {
        self.pacer.wait().await;
        debug!(source = self.name, host, path, "Fetching page");
        metrics::counter!("showscrape_pages_fetched_total", "source" => self.name).increment(1);

        let result = self.fetcher.fetch(host, path, &self.source.user_agent).await;
        self.pacer.done();

        let result = result.and_then(|body| {
            if body.trim().is_empty() {
                Err(ScrapeError::EmptyBody {
                    host: host.to_string(),
                    path: path.to_string(),
                })
            } else {
                Ok(body)
            }
        });

        match result {
            Ok(body) => Some(body),
            Err(e) => {
                metrics::counter!("showscrape_fetch_failures_total", "source" => self.name)
                    .increment(1);
                if e.is_page_level() {
                    warn!(source = self.name, error = %e, "No content from page");
                } else {
                    debug!(source = self.name, error = %e, "No content from page");
                }
                None
            }
        }
    }
}

/// Splits an absolute URL into host and path+query. Relative URLs give
/// `Ok(None)`.
pub fn split_url(url: &str) -> Result<Option<(String, String)>> {
    if !url.contains("://") {
        return Ok(None);
    }

    let parsed = Url::parse(url).map_err(|e| ScrapeError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let host = parsed.host_str().ok_or_else(|| ScrapeError::InvalidUrl {
        url: url.to_string(),
        reason: "missing host".to_string(),
    })?;

    let host = match parsed.port() {
        Some(port) => format!("{}://{host}:{port}", parsed.scheme()),
        None => format!("{}://{host}", parsed.scheme()),
    };

    let mut path = parsed.path().to_string();
    if let Some(query) = parsed.query() {
        path.push('?');
        path.push_str(query);
    }

    Ok(Some((host, path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_absolute_url() {
        let (host, path) = split_url("https://myanimelist.net/anime/52991/Sousou_no_Frieren")
            .unwrap()
            .unwrap();
        assert_eq!(host, "https://myanimelist.net");
        assert_eq!(path, "/anime/52991/Sousou_no_Frieren");

        let (host, path) = split_url("http://www.mangaupdates.com/series.html?id=42")
            .unwrap()
            .unwrap();
        assert_eq!(host, "http://www.mangaupdates.com");
        assert_eq!(path, "/series.html?id=42");
    }

    #[test]
    fn test_split_relative_url() {
        assert!(split_url("/encyclopedia/anime.php?id=1").unwrap().is_none());
    }

    #[test]
    fn test_split_invalid_url() {
        assert!(matches!(
            split_url("https://"),
            Err(ScrapeError::InvalidUrl { .. })
        ));
    }

    /// Takes `latency` to answer and records when each request was issued
    /// and when it completed.
    struct SlowFetcher {
        latency: Duration,
        calls: Mutex<Vec<(Instant, Instant)>>,
    }

    #[async_trait]
    impl PageFetcher for SlowFetcher {
        async fn fetch(&self, _host: &str, _path: &str, _user_agent: &str) -> Result<String> {
            let issued = Instant::now();
            tokio::time::sleep(self.latency).await;
            self.calls.lock().unwrap().push((issued, Instant::now()));
            Ok("<html></html>".to_string())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacer_spaces_requests() {
        let pacer = Pacer::new(Duration::from_secs(1));
        let start = Instant::now();

        pacer.wait().await;
        assert!(start.elapsed() < Duration::from_millis(10));
        pacer.done();

        pacer.wait().await;
        pacer.done();
        pacer.wait().await;
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_pacer_without_delay_does_not_sleep() {
        let pacer = Pacer::new(Duration::ZERO);
        let start = std::time::Instant::now();
        for _ in 0..5 {
            pacer.wait().await;
            pacer.done();
        }
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_follows_slow_fetch() {
        let fetcher = Arc::new(SlowFetcher {
            latency: Duration::from_secs(3),
            calls: Mutex::new(Vec::new()),
        });
        let scraper = ScraperConfig {
            page_delay_ms: 1000,
            ..ScraperConfig::default()
        };
        let site = SiteClient::new(
            "test",
            SourceConfig::new("example.org", "scrape/test"),
            &scraper,
            fetcher.clone(),
        );

        assert!(site.get_page("/one").await.is_some());
        assert!(site.get_page("/two").await.is_some());

        let calls = fetcher.calls.lock().unwrap();
        let (_, first_done) = calls[0];
        let (second_issued, _) = calls[1];
        assert!(second_issued.duration_since(first_done) >= Duration::from_secs(1));
    }
}
