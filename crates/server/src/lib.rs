//! docstore-server - HTTP service skeleton over the document-store access layer
//!
//! A thin axum front: it accepts HTTP requests, routes them to handlers,
//! applies cross-cutting middleware (CORS, timing, validation-error
//! formatting), and lets handlers read and write documents through the
//! `docstore` transaction and mapping layer. All storage semantics live in
//! that crate; this one is glue.
//!
//! # Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /version` - Deployed application version
//! - `GET /records/{collection}/{uid}` - Read a raw document
//! - `PUT /records/{collection}/{uid}` - Write a raw document
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
