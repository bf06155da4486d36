//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `health` - Health risk assessment: hashing, rules, result and cache types

pub mod foundation;
pub mod health;
