//! Library exports for spotify-relay, shared between the binary and tests.

pub mod config;
pub mod login;
pub mod routes;
pub mod session;
pub mod spotify;
pub mod startup;
pub mod state;
pub mod utils;
