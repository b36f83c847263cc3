use serde::{Deserialize, Serialize};

use crate::core::message::Source;

/// Body of a successful `GET /search`.
///
/// `response` is required; a body without it fails to decode. `sources` may be
/// missing or `null`, both meaning "no citations".
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchResponse {
    pub response: String,
    #[serde(default)]
    pub sources: Option<Vec<Source>>,
}

impl SearchResponse {
    pub fn new(response: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            response: response.into(),
            sources: Some(sources),
        }
    }

    /// Split into answer text and citations (empty when absent).
    pub fn into_parts(self) -> (String, Vec<Source>) {
        (self.response, self.sources.unwrap_or_default())
    }
}
