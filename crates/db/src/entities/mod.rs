//! Database entities.

pub mod area;
pub mod city;
pub mod issue;
pub mod notification;
pub mod upvote;
pub mod user;
pub mod zone;

pub use area::Entity as Area;
pub use city::Entity as City;
pub use issue::Entity as Issue;
pub use notification::Entity as Notification;
pub use upvote::Entity as Upvote;
pub use user::Entity as User;
pub use zone::Entity as Zone;
