//! HTTP surface for the Canta backend.

pub mod server;
pub mod vision_api;

pub use server::{start_server, GatewayState};
