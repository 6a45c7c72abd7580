//! Kaabil web form.

pub mod config;
pub mod error;
pub mod handlers;
pub mod page;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{WebError, WebResult};
pub use routes::create_router;
pub use state::{AppState, SessionStore};
