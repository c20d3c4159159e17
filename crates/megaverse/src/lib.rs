//! Megaverse client: rate-limited placement of typed grid cells and
//! goal-map replay against the Megaverse HTTP API.

pub mod builder;
pub mod config;
pub mod dispatch;
pub mod rate_limit;
pub mod repository;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::{BuildReport, BuildStatus, GoalMapBuilder};
pub use config::{resolve_config_path, MegaverseConfig};
pub use dispatch::{Outcome, RequestDispatcher};
pub use rate_limit::RateLimiter;
pub use repository::{cross_positions, ObjectRepository};
pub use transport::{
    HttpTransport, Method, Transport, TransportError, TransportErrorKind, TransportResponse,
};
pub use types::*;
