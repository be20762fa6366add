use chrono::{DateTime, Utc};
use reqwest::Url;

use crate::{
    models::user::User,
    utils::decode::{
        DecodeError, JsonDecodable, JsonObject, optional_field, optional_timestamp,
        require_field, require_timestamp, require_url,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub struct Repository {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub is_private: bool,
    pub html_url: Url,
    pub description: Option<String>,
    pub fork: bool,
    pub url: Url,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub homepage: Option<String>,
    pub size: i64,
    pub stargazers_count: i64,
    pub watchers_count: i64,
    pub language: Option<String>,
    pub forks_count: i64,
    pub open_issues_count: i64,
    pub master_branch: Option<String>,
    pub default_branch: String,
    pub score: f64,
    pub owner: User,
}

impl JsonDecodable for Repository {
    /// Fields are read in declaration order; the first bad field wins.
    /// Errors from `owner` surface with the owner's own key names.
    fn decode(json: &JsonObject) -> Result<Self, DecodeError> {
        Ok(Self {
            id: require_field(json, "id")?,
            name: require_field(json, "name")?,
            full_name: require_field(json, "full_name")?,
            is_private: require_field(json, "private")?,
            html_url: require_url(json, "html_url")?,
            description: optional_field(json, "description")?,
            fork: require_field(json, "fork")?,
            url: require_url(json, "url")?,
            created_at: require_timestamp(json, "created_at")?,
            updated_at: require_timestamp(json, "updated_at")?,
            pushed_at: optional_timestamp(json, "pushed_at")?,
            homepage: optional_field(json, "homepage")?,
            size: require_field(json, "size")?,
            stargazers_count: require_field(json, "stargazers_count")?,
            watchers_count: require_field(json, "watchers_count")?,
            language: optional_field(json, "language")?,
            forks_count: require_field(json, "forks_count")?,
            open_issues_count: require_field(json, "open_issues_count")?,
            master_branch: optional_field(json, "master_branch")?,
            default_branch: require_field(json, "default_branch")?,
            score: require_field(json, "score")?,
            owner: User::decode(require_field(json, "owner")?)?,
        })
    }
}
