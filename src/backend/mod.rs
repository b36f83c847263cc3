pub mod dispatch;
pub mod http;
pub mod search;
pub mod types;

pub use http::HttpBackend;
pub use search::{BackendError, SearchBackend};
pub use types::SearchResponse;
