//! Core business logic for elytra.

pub mod services;

pub use services::*;
