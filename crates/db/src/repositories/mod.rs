//! Database repositories.

mod area;
mod city;
mod issue;
mod notification;
mod upvote;
mod user;
mod zone;

pub use area::AreaRepository;
pub use city::CityRepository;
pub use issue::IssueRepository;
pub use notification::NotificationRepository;
pub use upvote::UpvoteRepository;
pub use user::UserRepository;
pub use zone::ZoneRepository;
