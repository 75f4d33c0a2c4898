pub mod event_handlers;
pub mod feed_service;
pub mod scoring;

pub use event_handlers::ContentEventHandler;
pub use feed_service::FeedService;
pub use scoring::RelevanceScorer;
