mod admin;
mod analytics;
mod health;
mod upload;

pub use admin::admin_router;
pub use analytics::analytics_router;
pub use health::health_router;
pub use upload::upload_router;
