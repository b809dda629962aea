pub mod handlers;
pub mod requester;
pub mod response;
mod routes;

pub use routes::create_router;
