pub mod config;
pub mod error;
pub mod es;
pub mod events;
pub mod hashtags;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
pub use es::EsClient;
pub use services::indexing::IndexingService;
pub use services::search::SearchService;
