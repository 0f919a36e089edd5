pub mod types;

pub mod websites;
pub mod user_sessions;
pub mod page_views;
pub mod events;
pub mod device_info;

pub mod orders;
pub mod order_details;

pub mod conversations;
pub mod messages;

pub mod prelude;
