pub mod error;
pub mod fingerprint;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod search;

pub use error::{ApiError, ErrorResponse};
pub use middleware::metrics_middleware;
pub use routes::create_router;
