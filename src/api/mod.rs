pub mod handlers;
pub mod responses;
pub mod routes;

pub use handlers::ApiError;
pub use responses::*;
pub use routes::create_router;
