//! Network layer - authenticated backend calls
//!
//! The Network actor receives `ApiCall`s and sends back responses. Every call
//! goes through `ApiClient`, which owns the token renewal policy.

pub mod actor;
pub mod api;
pub mod client;
pub mod endpoints;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use actor::NetworkActor;
pub use client::ApiClient;
