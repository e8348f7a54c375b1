use std::error::Error;
use std::io;

use chrono::Utc;
use futures::future::{BoxFuture, FutureExt};
use reqwest::header::HeaderMap;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::Config;

/// Performs one GET and returns the body as text.
///
/// Transport problems and non-success statuses both surface as
/// [`io::Error`]; the loader does not distinguish between them.
pub trait HttpFetcher: Send + Sync + 'static {
    fn get_response_text(&self, url: Url) -> BoxFuture<'static, io::Result<String>>;
}

/// [`HttpFetcher`] backed by reqwest, speaking to the GitHub REST API.
#[derive(Clone)]
pub struct GitHubFetcher {
    client: Client,
    token: Option<String>,
}

impl GitHubFetcher {
    pub fn new(config: &Config) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let client = Client::builder().user_agent(&config.user_agent).build()?;

        Ok(GitHubFetcher {
            client,
            token: config.token.clone(),
        })
    }

    async fn fetch_text(client: Client, token: Option<String>, url: Url) -> io::Result<String> {
        debug!("Requesting URL: {}", url);
        let mut request = client
            .get(url.clone())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(io::Error::other)?;
        let status = response.status();

        if !status.is_success() {
            log_rate_limit(response.headers());
            return Err(io::Error::other(format!("API error: {} for {}", status, url)));
        }

        let body = response.text().await.map_err(io::Error::other)?;
        debug!("Received {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

impl HttpFetcher for GitHubFetcher {
    fn get_response_text(&self, url: Url) -> BoxFuture<'static, io::Result<String>> {
        GitHubFetcher::fetch_text(self.client.clone(), self.token.clone(), url).boxed()
    }
}

/// Seconds until the rate limit resets, when the headers say it is spent.
fn rate_limit_wait(headers: &HeaderMap, now: i64) -> Option<u64> {
    let remaining = headers
        .get("x-ratelimit-remaining")?
        .to_str()
        .ok()?
        .parse::<u32>()
        .ok()?;
    if remaining > 0 {
        return None;
    }
    let reset = headers
        .get("x-ratelimit-reset")?
        .to_str()
        .ok()?
        .parse::<i64>()
        .ok()?;
    Some(reset.saturating_sub(now).max(0) as u64)
}

fn log_rate_limit(headers: &HeaderMap) {
    if let Some(wait_secs) = rate_limit_wait(headers, Utc::now().timestamp()) {
        warn!(
            "Rate limit reached. Searches will fail for another {} seconds",
            wait_secs
        );
    }
}
