pub mod notifications;
pub mod preferences;

pub use notifications::register_routes as register_notifications;
pub use preferences::register_routes as register_preferences;
