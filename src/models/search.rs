use crate::utils::decode::{DecodeError, JsonDecodable, JsonObject, require_field, require_objects};

/// One page of a search response. `items` keeps the server's order.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<T> {
    pub total_count: i64,
    pub incomplete_results: bool,
    pub items: Vec<T>,
}

impl<T: JsonDecodable> JsonDecodable for SearchResult<T> {
    fn decode(json: &JsonObject) -> Result<Self, DecodeError> {
        let total_count = require_field(json, "total_count")?;
        let incomplete_results = require_field(json, "incomplete_results")?;
        let items = require_objects(json, "items")?
            .into_iter()
            .map(T::decode)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            total_count,
            incomplete_results,
            items,
        })
    }
}
