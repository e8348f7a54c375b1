//! # GitHub Query Loader
//!
//! Search GitHub repositories from the terminal and show the raw JSON
//! response. A single-flight [`QueryLoader`] runs the request on a
//! background task, caches the result, and redelivers it when the screen
//! is recreated instead of searching again.
//!
//! ## Main Components
//!
//! - [`UrlBuilder`]: turns a free-text query into a search URL
//! - [`HttpFetcher`] / [`GitHubFetcher`]: one GET, body as text
//! - [`QueryLoader`]: the `NotStarted -> InFlight -> Completed` lifecycle
//! - [`Screen`]: displays the URL, the payload or the error message
//! - [`App`]: owns the loader and drives screen attach/detach
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use clap::Parser;
//! use github_query_loader::{App, Args, Config, GitHubFetcher, IndicatorMode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let config = Config::from_args(&Args::parse())?;
//!     let fetcher = Arc::new(GitHubFetcher::new(&config)?);
//!     let mut app = App::new(fetcher, config.url_builder(), IndicatorMode::Terminal);
//!
//!     app.submit("tokio");
//!     app.pump().await;
//!     app.render(&mut std::io::stdout())?;
//!     Ok(())
//! }
//! ```

mod app;
mod args;
mod config;
mod error;
mod fetcher;
mod loader;
mod request;
mod screen;
mod url_builder;

pub use crate::app::{App, Command};
pub use crate::args::Args;
pub use crate::config::Config;
pub use crate::error::QueryError;
pub use crate::fetcher::{GitHubFetcher, HttpFetcher};
pub use crate::loader::{fetch, LoadObserver, LoaderState, QueryLoader, StartOutcome};
pub use crate::request::{SearchRequest, SearchResult};
pub use crate::screen::{
    IndicatorMode, LoadingIndicator, SavedState, Screen, ERROR_MESSAGE, SEARCH_URL_QUERY_EXTRA,
};
pub use crate::url_builder::{UrlBuilder, DEFAULT_SORT, GITHUB_SEARCH_URL};
