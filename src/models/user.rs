use reqwest::Url;

use crate::utils::decode::{DecodeError, JsonDecodable, JsonObject, require_field, require_url};

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub login: String,
    pub id: i64,
    pub avatar_url: Url,
    pub gravatar_id: String,
    pub url: Url,
    pub received_events_url: Url,
    pub user_type: String,
}

impl JsonDecodable for User {
    fn decode(json: &JsonObject) -> Result<Self, DecodeError> {
        Ok(Self {
            login: require_field(json, "login")?,
            id: require_field(json, "id")?,
            avatar_url: require_url(json, "avatar_url")?,
            gravatar_id: require_field(json, "gravatar_id")?,
            url: require_url(json, "url")?,
            received_events_url: require_url(json, "received_events_url")?,
            user_type: require_field(json, "type")?,
        })
    }
}
