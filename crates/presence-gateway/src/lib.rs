//! Presence Gateway - HTTP surface for presence records
//!
//! Exposes a single resource, `/users`, with stateless CRUD handlers. Every
//! handler does exactly one store round trip through `dyn PresenceStore`, so
//! the same code serves the durable and the in-memory backend.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               Presence Gateway              │
//! ├─────────────────────────────────────────────┤
//! │  TraceLayer → CORS headers → /users, /health│
//! │                     │                       │
//! │          spawn_blocking(store call)         │
//! │                     │                       │
//! │   ┌─────────────────▼──────────────────┐    │
//! │   │  Arc<dyn PresenceStore> (selected  │    │
//! │   │  once at startup: sqlite | memory) │    │
//! │   └────────────────────────────────────┘    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Endpoints
//!
//! | Method  | Path          | Success                        |
//! |---------|---------------|--------------------------------|
//! | GET     | /users[?id=N] | 200 list or single record      |
//! | POST    | /users        | 201 created record             |
//! | PATCH   | /users?id=N   | 200 updated record             |
//! | DELETE  | /users?id=N   | 204                            |
//! | OPTIONS | /users        | 204 with CORS headers          |
//! | GET     | /health       | 200 backend and record count   |

pub mod config;
pub mod cors;
pub mod error;
pub mod gateway;
pub mod routes;

pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use gateway::{Gateway, GatewayState};

/// Gateway version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3000;

/// Default host
pub const DEFAULT_HOST: &str = "127.0.0.1";
