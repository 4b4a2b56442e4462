//! Server API boundary.
//!
//! `Transport` abstracts the HTTP layer (a `reqwest`-backed implementation is
//! provided, tests use a scripted mock); `ApiClient` turns the group-calendar
//! endpoints into typed calls and maps failures onto `ApiError`.

pub mod client;
pub mod transport;

pub use client::ApiClient;
pub use transport::{HttpTransport, Method, Transport, TransportResponse};
