//! HTTP transports
//!
//! A [`Transport`] sends one [`SubmissionRequest`] and hands back the raw
//! status and body. Interpreting the body is left to
//! [`ResponsePayload`](crate::ResponsePayload).
//!
//! - [`FetchTransport`] (WASM): `window.fetch` with the form's `FormData`
//! - [`ReqwestTransport`] (native): `reqwest` with a multipart body
//!
//! Neither sets `Content-Type`: the multipart encoder picks the boundary.

#[cfg(target_arch = "wasm32")]
mod fetch;
#[cfg(not(target_arch = "wasm32"))]
mod native;

#[cfg(target_arch = "wasm32")]
pub use fetch::FetchTransport;
#[cfg(not(target_arch = "wasm32"))]
pub use native::ReqwestTransport;

use crate::error::SubmitError;
use crate::payload::RawResponse;
use crate::request::SubmissionRequest;
use async_trait::async_trait;

/// Sends a submission and returns the server's raw answer.
///
/// Non-2xx statuses are not errors at this level; only failures to get any
/// response at all are.
#[async_trait(?Send)]
pub trait Transport<B> {
	/// Sends the request once.
	async fn send(&self, request: SubmissionRequest<B>) -> Result<RawResponse, SubmitError>;
}
