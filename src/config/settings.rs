use anyhow::{Error, anyhow};
use dotenvy::dotenv;
use envy::from_env;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

fn default_github_api_url() -> String {
    "https://api.github.com/".to_string()
}

fn default_user_agent() -> String {
    "gitsearch-agent".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

// Matches the search API's own default page size.
fn default_page_size() -> u32 {
    30
}

fn default_max_pages() -> u32 {
    3
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_api_url: default_github_api_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            log_dir: default_log_dir(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = from_env::<Self>().map_err(|e| anyhow!("Configuration error: {}", e))?;

        if config.page_size == 0 {
            return Err(anyhow!("Configuration error: page_size must be at least 1"));
        }

        Ok(config)
    }
}
