pub mod handlers;
pub mod jobs;
pub mod routes;

pub use routes::create_router;
