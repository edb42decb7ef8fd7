pub mod app;
pub mod health;

pub use app::index;
pub use health::{health_check, readiness_check};
