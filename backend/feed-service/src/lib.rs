pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repo;
pub mod services;

pub use cache::FeedCache;
pub use config::Config;
pub use error::{AppError, Result};
pub use services::feed_service::FeedService;
pub use services::scoring::RelevanceScorer;
