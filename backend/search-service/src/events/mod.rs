pub mod handlers;

pub use handlers::{ContentEventHandler, UserEventHandler};
