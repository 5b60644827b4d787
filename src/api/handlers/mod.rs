//! # HTTP Handlers

pub mod health;
pub mod stats;
pub mod url;
