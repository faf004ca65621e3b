//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients and adapters for external services such as the push
//! notification gateway.

pub mod push;
