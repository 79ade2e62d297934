//! API middleware and shared state.

use elytra_core::{
    AreaService, CityService, IssueService, NotificationService, UpvoteService, UserService,
    ZoneService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub issue_service: IssueService,
    pub upvote_service: UpvoteService,
    pub notification_service: NotificationService,
    pub city_service: CityService,
    pub zone_service: ZoneService,
    pub area_service: AreaService,
}
