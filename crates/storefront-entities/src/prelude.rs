pub use super::conversations::Entity as Conversations;
pub use super::device_info::Entity as DeviceInfo;
pub use super::events::Entity as Events;
pub use super::messages::Entity as Messages;
pub use super::order_details::Entity as OrderDetails;
pub use super::orders::Entity as Orders;
pub use super::page_views::Entity as PageViews;
pub use super::user_sessions::Entity as UserSessions;
pub use super::websites::Entity as Websites;
