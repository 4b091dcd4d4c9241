//! MoMo wallet payment adapter (gateway A).

mod momo_gateway;
mod wire_types;

pub use momo_gateway::MomoGateway;
pub use wire_types::{MomoCreateRequest, MomoCreateResponse};
