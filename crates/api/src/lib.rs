//! Apresiasi API server library.
//!
//! Exposes config, state, error handling, the pin ledger and assessment
//! orchestration, and routes so integration tests and the binary entrypoint
//! can both access them.

pub mod assessment;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod ledger;
pub mod middleware;
pub mod response;
pub mod roles;
pub mod router;
pub mod routes;
pub mod state;
