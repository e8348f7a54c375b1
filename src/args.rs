use clap::Parser;

use crate::url_builder::{DEFAULT_SORT, GITHUB_SEARCH_URL};

/// Search GitHub repositories and show the raw JSON response.
///
/// With query words the search runs once and exits. Without them an
/// interactive prompt reads one query per line.
#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about,
    long_about = "Search GitHub repositories and print the raw JSON search response. \
                  Run without a query for an interactive session where each line is a search; \
                  ':rotate' recreates the screen, ':destroy' drops the loader, ':wait' blocks \
                  for the running search and ':quit' exits."
)]
pub struct Args {
    /// Words to search for. Joined with spaces into a single query.
    #[clap(value_name = "QUERY")]
    pub query: Vec<String>,

    /// Search endpoint the query is appended to.
    #[clap(short, long, default_value = GITHUB_SEARCH_URL)]
    pub base_url: String,

    /// Value of the `sort` parameter.
    #[clap(short, long, default_value = DEFAULT_SORT, conflicts_with = "no_sort")]
    pub sort: String,

    /// Leave the `sort` parameter out entirely.
    #[clap(long)]
    pub no_sort: bool,

    /// GitHub API token for authentication. Falls back to GITHUB_TOKEN.
    #[clap(short, long)]
    pub token: Option<String>,
}
