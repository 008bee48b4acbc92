pub mod cache;
pub mod error;
pub mod html;
pub mod routes;

pub use cache::ReportCache;
pub use routes::{build_router, ApiState};
