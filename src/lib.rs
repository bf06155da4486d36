//! Maternity Risk - Health risk assessment engine for pregnancy tracking
//!
//! Rule-based BMI and age classification from a health profile, optionally
//! enhanced by an external AI service, with results cached per profile and
//! invalidated by a content hash of the health data.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
