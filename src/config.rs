use std::env;
use std::error::Error;

use tracing::debug;
use url::Url;

use crate::{Args, UrlBuilder};

pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub sort: Option<String>,
    pub token: Option<String>,
    pub user_agent: String,
}

impl Config {
    pub fn from_args(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let base_url = Url::parse(&args.base_url)
            .map_err(|e| format!("invalid base URL '{}': {}", args.base_url, e))?;

        let sort = if args.no_sort || args.sort.trim().is_empty() {
            None
        } else {
            Some(args.sort.clone())
        };

        // Search works without a token, it only raises the rate limit.
        let token = match &args.token {
            Some(t) if !t.trim().is_empty() => Some(t.clone()),
            _ => match env::var(TOKEN_ENV) {
                Ok(token) if !token.trim().is_empty() => Some(token),
                _ => {
                    debug!("No GitHub token configured, searching unauthenticated");
                    None
                }
            },
        };

        Ok(Config {
            base_url,
            sort,
            token,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        })
    }

    pub fn url_builder(&self) -> UrlBuilder {
        UrlBuilder::new(self.base_url.clone(), self.sort.clone())
    }
}
