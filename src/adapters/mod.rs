//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - AI enhancement clients (chat completions API, mock)
//! - `http` - REST endpoints
//! - `memory` - In-memory stores for tests and local runs
//! - `postgres` - PostgreSQL profile reads and assessment cache

pub mod ai;
pub mod http;
pub mod memory;
pub mod postgres;
