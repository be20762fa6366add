use std::fmt;

use crate::{
    models::{repository::Repository, search::SearchResult},
    utils::decode::JsonDecodable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(value: HttpMethod) -> Self {
        match value {
            HttpMethod::Get => reqwest::Method::GET,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(val) => f.write_str(val),
            ParamValue::Int(val) => write!(f, "{}", val),
            ParamValue::Bool(val) => write!(f, "{}", val),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

/// Ordered query parameters. A `None` value means the key is left off the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<(String, Option<ParamValue>)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<V: Into<ParamValue>>(mut self, key: &str, value: Option<V>) -> Self {
        self.entries.push((key.to_string(), value.map(Into::into)));
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .and_then(|(_, value)| value.as_ref())
    }

    pub fn entries(&self) -> &[(String, Option<ParamValue>)] {
        &self.entries
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter_map(|(key, value)| value.as_ref().map(|val| (key.clone(), val.to_string())))
            .collect()
    }
}

/// Describes one API call and the shape its response decodes into.
pub trait ApiEndpoint {
    type Response: JsonDecodable;

    fn path(&self) -> &str;

    fn method(&self) -> HttpMethod;

    fn parameters(&self) -> Parameters;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRepositories {
    pub query: String,
    pub page: u32,
    pub per_page: Option<u32>,
}

impl SearchRepositories {
    pub fn new(query: &str, page: u32) -> Self {
        Self {
            query: query.to_string(),
            page,
            per_page: None,
        }
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }
}

impl ApiEndpoint for SearchRepositories {
    type Response = SearchResult<Repository>;

    fn path(&self) -> &str {
        "search/repositories"
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn parameters(&self) -> Parameters {
        Parameters::new()
            .with("q", Some(self.query.as_str()))
            .with("page", Some(self.page))
            .with("per_page", self.per_page)
    }
}
