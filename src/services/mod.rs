pub mod analytics;
pub mod athlete_store;
pub mod clubs;
pub mod html;
pub mod rate_limit;
pub mod strava;
pub mod template_report;
pub mod template_sync;

pub use clubs::init_clubs;
pub use html::inject_config;
pub use rate_limit::RateLimiter;
pub use strava::StravaClient;
pub use template_sync::{sync_catalogue, ExistingPolicy, SyncOptions};
