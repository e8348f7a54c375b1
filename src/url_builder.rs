use url::Url;

use crate::SearchRequest;

pub const GITHUB_SEARCH_URL: &str = "https://api.github.com/search/repositories";
pub const DEFAULT_SORT: &str = "stars";

const PARAM_QUERY: &str = "q";
const PARAM_SORT: &str = "sort";

/// Turns free-text queries into search endpoint URLs.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base: Url,
    sort: Option<String>,
}

impl UrlBuilder {
    pub fn new(base: Url, sort: Option<String>) -> Self {
        UrlBuilder { base, sort }
    }

    pub fn build(&self, query: &str) -> Url {
        let mut url = self.base.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear().append_pair(PARAM_QUERY, query);
            if let Some(sort) = &self.sort {
                pairs.append_pair(PARAM_SORT, sort);
            }
        }
        url
    }

    pub fn build_request(&self, query: &str) -> SearchRequest {
        SearchRequest::from(self.build(query))
    }
}
