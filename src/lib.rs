// Library exports for the CLI and tests
pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod identity;
pub mod models;
pub mod session;
pub mod token;
pub mod views;
