pub mod api;
pub mod error;

pub use api::{build_router, AppState, ArticlesResponse, HealthResponse};
pub use error::ApiError;
