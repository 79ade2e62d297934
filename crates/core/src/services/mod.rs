//! Business logic services.

pub mod area;
pub mod city;
pub mod issue;
pub mod notification;
pub mod upvote;
pub mod user;
pub mod zone;

pub use area::AreaService;
pub use city::CityService;
pub use issue::{CreateIssueInput, IssueService, IssueSort, UpdateIssueInput};
pub use notification::NotificationService;
pub use upvote::UpvoteService;
pub use user::{RegisterUserInput, UserService};
pub use zone::ZoneService;
