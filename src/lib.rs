// Library root for herd-gate: request gate and API client for the livestock service

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod core;
pub mod state;
