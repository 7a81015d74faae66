//! memeguard Server
//!
//! HTTP endpoint that classifies a meme (image plus caption text) as
//! offensive or non-offensive.
//!
//! The model is loaded once at startup and shared read-only by every
//! request; inference runs on the blocking thread pool.

pub mod cli;
pub mod config;
pub mod docs;
pub mod routes;
pub mod state;

pub use cli::Cli;
pub use config::ServerConfig;
pub use routes::create_router;
pub use state::AppState;
