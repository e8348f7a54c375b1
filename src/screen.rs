use std::io::{self, Write};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Map, Value};
use tracing::debug;

use crate::loader::LoadObserver;
use crate::{SearchRequest, SearchResult, UrlBuilder};

/// Saved-state key holding the last displayed search URL.
pub const SEARCH_URL_QUERY_EXTRA: &str = "query";

pub const ERROR_MESSAGE: &str = "Failed to get results. Please try again.";

/// String-keyed state that outlives one screen instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavedState(Map<String, Value>);

impl SavedState {
    pub fn put_string(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), Value::String(value.into()));
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorMode {
    /// Draw an animated spinner on stderr.
    Terminal,
    /// Track visibility only.
    Hidden,
}

/// Spinner shown while a search is in flight.
pub struct LoadingIndicator {
    mode: IndicatorMode,
    bar: Option<ProgressBar>,
}

impl LoadingIndicator {
    pub fn new(mode: IndicatorMode) -> Self {
        LoadingIndicator { mode, bar: None }
    }

    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }

    pub fn show(&mut self, message: &str) {
        let mode = self.mode;
        let bar = self.bar.get_or_insert_with(|| match mode {
            IndicatorMode::Hidden => ProgressBar::hidden(),
            IndicatorMode::Terminal => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} [{elapsed_precise}] {wide_msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner())
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
                );
                bar.enable_steady_tick(Duration::from_millis(80));
                bar
            }
        });
        bar.set_message(message.to_string());
    }

    pub fn hide(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl Drop for LoadingIndicator {
    fn drop(&mut self) {
        self.hide();
    }
}

/// The search screen: URL display, results view, error view and the
/// loading indicator.
pub struct Screen {
    url_display: String,
    search_results: String,
    results_visible: bool,
    error_visible: bool,
    indicator: LoadingIndicator,
    github_url: Option<String>,
}

impl Screen {
    /// Create a screen, restoring the displayed URL from `saved` if given.
    pub fn create(saved: Option<&SavedState>, mode: IndicatorMode) -> Self {
        let mut screen = Screen {
            url_display: String::new(),
            search_results: String::new(),
            results_visible: false,
            error_visible: false,
            indicator: LoadingIndicator::new(mode),
            github_url: None,
        };

        if let Some(url) = saved.and_then(|s| s.get_string(SEARCH_URL_QUERY_EXTRA)) {
            debug!("Restoring displayed URL {}", url);
            screen.url_display = url.to_string();
            screen.github_url = Some(url.to_string());
        }

        screen
    }

    /// Build the URL for `query`, show it, and return it as a request.
    pub fn make_search_query(&mut self, builder: &UrlBuilder, query: &str) -> SearchRequest {
        let request = builder.build_request(query);
        self.show_url(request.as_str());
        request
    }

    /// Point the URL display (and the saved URL) at `url`.
    pub fn show_url(&mut self, url: &str) {
        self.url_display = url.to_string();
        self.github_url = Some(url.to_string());
    }

    pub fn save_state(&self) -> SavedState {
        let mut state = SavedState::default();
        if let Some(url) = &self.github_url {
            state.put_string(SEARCH_URL_QUERY_EXTRA, url.as_str());
        }
        state
    }

    pub fn url_display(&self) -> &str {
        &self.url_display
    }

    pub fn search_results(&self) -> &str {
        &self.search_results
    }

    pub fn is_results_visible(&self) -> bool {
        self.results_visible
    }

    pub fn is_error_visible(&self) -> bool {
        self.error_visible
    }

    pub fn is_loading(&self) -> bool {
        self.indicator.is_visible()
    }

    fn show_json_data_view(&mut self) {
        self.error_visible = false;
        self.results_visible = true;
    }

    fn show_error_message(&mut self) {
        self.results_visible = false;
        self.error_visible = true;
    }

    /// Write the visible parts of the screen as plain text.
    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if !self.url_display.is_empty() {
            writeln!(out, "URL: {}", self.url_display)?;
        }
        if self.results_visible {
            writeln!(out, "{}", self.search_results)?;
        }
        if self.error_visible {
            writeln!(out, "{}", ERROR_MESSAGE)?;
        }
        out.flush()
    }
}

impl LoadObserver for Screen {
    fn on_load_started(&mut self, request: &SearchRequest) {
        self.indicator.show(&format!("Searching {}", request));
    }

    fn on_load_finished(&mut self, result: &SearchResult) {
        self.indicator.hide();
        match result.payload() {
            Some(text) => {
                self.show_json_data_view();
                self.search_results = text.to_string();
            }
            None => self.show_error_message(),
        }
    }
}
