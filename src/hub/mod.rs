//! Hub resource accessor
//!
//! Typed get/update operations against the four resource kinds on the hub
//! control plane. The `HubApi` trait is the seam between the DR engine and
//! the cluster: `HttpHub` talks to a real hub over REST, `InMemoryHub` backs
//! the tests with an in-process store.

pub mod api;
pub mod client;
pub mod memory;

pub use api::{ApiError, HubApi};
pub use client::HttpHub;
pub use memory::InMemoryHub;
