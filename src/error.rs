use thiserror::Error;

/// Everything that can go wrong while loading one search request.
///
/// None of these reach the screen: the loader logs them and hands the
/// observer [`SearchResult::Empty`](crate::SearchResult::Empty) instead.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("search URL is blank")]
    BlankUrl,

    #[error("search URL is malformed: {0}")]
    MalformedUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("response body is empty")]
    EmptyBody,
}
