// Request authentication & authorization gate

pub mod audit_logger;
pub mod auth_middleware;
pub mod custom_header;
pub mod decision;
pub mod token;
