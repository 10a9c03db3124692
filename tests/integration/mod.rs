// Integration tests organized by module

#[path = "../common/mod.rs"]
mod common;

#[path = "api/test_gate_routes.rs"]
mod test_gate_routes;

#[path = "api/test_resources.rs"]
mod test_resources;

#[path = "client/test_api_client.rs"]
mod test_api_client;

#[path = "client/test_round_trip.rs"]
mod test_round_trip;
