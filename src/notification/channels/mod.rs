//! Concrete message channel implementations.

pub mod console;
pub mod http_gateway;

pub use console::ConsoleChannel;
pub use http_gateway::{HttpGatewayChannel, HttpGatewayConfig};
