//! Error types for AJAX form submission.

/// Errors raised while binding, submitting or reconciling a form.
///
/// Validation failures reported by the server are not errors here: they are
/// rendered into the form and reported as
/// [`SubmitOutcome::ErrorsRendered`](crate::SubmitOutcome::ErrorsRendered).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
	/// No element with the given id exists in the document.
	#[error("form '#{0}' not found")]
	FormNotFound(String),

	/// A DOM query or mutation failed.
	#[error("DOM error: {0}")]
	Dom(String),

	/// The request could not be built, sent, or its body could not be read.
	#[error("transport error: {0}")]
	Transport(String),

	/// The response body was not of the expected JSON shape.
	#[error("malformed response (status {status}): {reason}")]
	MalformedResponse {
		/// HTTP status of the response
		status: u16,
		/// Parser message
		reason: String,
	},

	/// Changing the page location failed.
	#[error("navigation to '{url}' failed: {reason}")]
	Navigation {
		/// Target URL
		url: String,
		/// Underlying failure
		reason: String,
	},

	/// Settings could not be parsed.
	#[error("invalid settings: {0}")]
	Config(String),
}

impl SubmitError {
	/// Create a DOM error
	pub fn dom(msg: impl Into<String>) -> Self {
		Self::Dom(msg.into())
	}

	/// Create a transport error
	pub fn transport(msg: impl Into<String>) -> Self {
		Self::Transport(msg.into())
	}

	/// Create a malformed-response error
	pub fn malformed(status: u16, reason: impl Into<String>) -> Self {
		Self::MalformedResponse {
			status,
			reason: reason.into(),
		}
	}
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for SubmitError {
	fn from(value: wasm_bindgen::JsValue) -> Self {
		Self::Dom(format!("{:?}", value))
	}
}
