use clap::Parser;

/// Search GitHub repositories and page through the results.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
pub struct Args {
    /// Search terms, joined with spaces into one query (qualifiers such as
    /// `language:rust` are passed through as-is).
    #[clap(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Maximum number of pages to fetch. Overrides MAX_PAGES.
    #[clap(short = 'p', long, value_name = "NUM")]
    pub pages: Option<u32>,

    /// Results per page, at most 100. Overrides PAGE_SIZE.
    #[clap(short = 's', long, value_name = "NUM")]
    pub page_size: Option<u32>,
}

impl Args {
    pub fn joined_query(&self) -> String {
        self.query.join(" ")
    }
}
