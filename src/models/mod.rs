pub mod asset;
pub mod asset_list;
pub mod case_counter;
pub mod case_overview;
pub mod message;
pub mod notification;
pub mod notification_list;
pub mod profile;
pub mod profile_case;
pub mod push_token;
pub mod timeline_entry;
pub mod timeline_list;
pub mod user;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::asset::{self, Entity as Asset};
    pub use super::asset_list::{self, Entity as AssetList};
    pub use super::case_counter::{self, Entity as CaseCounter};
    pub use super::case_overview::{self, Entity as CaseOverview};
    pub use super::message::{self, Entity as Message};
    pub use super::notification::{self, Entity as Notification};
    pub use super::notification_list::{self, Entity as NotificationList};
    pub use super::profile::{self, Entity as Profile};
    pub use super::profile_case::{self, Entity as ProfileCase};
    pub use super::push_token::{self, Entity as PushToken};
    pub use super::timeline_entry::{self, Entity as TimelineEntry};
    pub use super::timeline_list::{self, Entity as TimelineList};
    pub use super::user::{self, Entity as User};
}
