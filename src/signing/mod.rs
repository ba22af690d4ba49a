//! Multi-party signing coordination
//!
//! Descriptors bind input positions to wallets; the service runs them in
//! order against a transaction copy so several wallets (local or remote)
//! can each sign the inputs they own.

pub mod descriptor;
pub mod service;

pub use descriptor::InputSignDescriptor;
pub use service::{SignError, SignService};
