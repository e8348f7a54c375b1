use std::fmt;

use url::Url;

use crate::error::QueryError;

/// The fully qualified URL of one search, as handed to the loader.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchRequest(String);

impl SearchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        SearchRequest(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the request into a URL, rejecting blank strings up front.
    pub fn parse_url(&self) -> Result<Url, QueryError> {
        if self.0.trim().is_empty() {
            return Err(QueryError::BlankUrl);
        }
        Ok(Url::parse(&self.0)?)
    }
}

impl From<Url> for SearchRequest {
    fn from(url: Url) -> Self {
        SearchRequest(url.into())
    }
}

impl fmt::Display for SearchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of one fetch: the raw response text, or nothing at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult {
    Payload(String),
    Empty,
}

impl SearchResult {
    /// An empty body is indistinguishable from a failed search.
    pub fn from_body(body: String) -> Self {
        if body.is_empty() {
            SearchResult::Empty
        } else {
            SearchResult::Payload(body)
        }
    }

    pub fn payload(&self) -> Option<&str> {
        match self {
            SearchResult::Payload(text) => Some(text),
            SearchResult::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, SearchResult::Empty)
    }
}
