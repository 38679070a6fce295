//! # palaver-transport
//!
//! The transport gateway: request/response calls to the remote messaging
//! service plus the long-lived push-notification subscription.
//!
//! No business logic lives here. The gateway issues one HTTP call per
//! operation and reports every outcome through the three-class
//! [`GatewayError`] taxonomy; the push listener forwards every inbound frame
//! as an opaque "something changed" signal without interpreting it.

pub mod error;
pub mod gateway;
pub mod push;

pub use error::GatewayError;
pub use gateway::{Gateway, HttpGateway};
pub use push::{spawn_push_listener, PushConfig, PushHandle, PushSignal};
