pub mod backend;
pub mod controller;
pub mod error;
pub mod query;
pub mod state;

pub use backend::{HttpSearchBackend, SearchBackend};
pub use controller::{FetchOutcome, SearchController, MAX_LOAD_ALL_PAGES};
pub use error::ClientError;
pub use query::build_query;
pub use state::{SearchState, SearchStatus};
