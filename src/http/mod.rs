//! HTTP layer
//!
//! A thin request/response model over reqwest, exposed through the
//! [`Transport`] trait so the runner can be driven by other transports.

mod client;
mod transport;

pub use client::ReqwestTransport;
pub use transport::{HttpRequest, HttpResponse, Method, Transport};
