pub mod apns_client;
pub mod event_handlers;
pub mod fcm_client;
pub mod notification_service;
pub mod push_sender;
pub mod retention;

pub use apns_client::ApnsClient;
pub use event_handlers::{ContentEventHandler, SocialEventHandler};
pub use fcm_client::{FcmClient, ServiceAccountKey};
pub use notification_service::NotificationService;
pub use push_sender::PushSender;
