pub mod indexing;
pub mod search;

pub use indexing::IndexingService;
pub use search::SearchService;
