//! Server response decoding
//!
//! Views answer an AJAX submission with a small JSON object:
//!
//! ```text
//! 2xx   { "location": "/next" }                  -> navigate
//!       { "render": "<form id=..>..</form>" }    -> replace the form's container
//! other { "location": "/login" }                 -> navigate
//!       { "error": "..", "errors": { "__all__": [..], "email": [..] } }
//! ```
//!
//! Empty strings count as absent, so `{"location": ""}` never navigates.

use crate::error::SubmitError;
use indexmap::IndexMap;
use serde::Deserialize;

/// Field name to messages, in the order the server listed them.
pub type ErrorMap = IndexMap<String, Vec<String>>;

/// Status and body of an HTTP response, as returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
	/// HTTP status code
	pub status: u16,
	/// Response body text
	pub body: String,
}

impl RawResponse {
	/// Creates a response.
	pub fn new(status: u16, body: impl Into<String>) -> Self {
		Self {
			status,
			body: body.into(),
		}
	}

	/// Whether the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// What the controller has to do with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePayload {
	/// Leave the page.
	Redirect {
		/// Target URL
		location: String,
		/// Message to show on the way out
		toast: Option<String>,
	},
	/// Swap the form's container contents for server-rendered markup.
	Replace {
		/// Replacement HTML
		markup: String,
	},
	/// Annotate the form with validation failures.
	Errors {
		/// Banner shown above the form
		message: Option<String>,
		/// Per-field and non-field messages
		errors: ErrorMap,
	},
	/// Successful response with nothing to apply.
	Empty,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResponseBody {
	location: Option<String>,
	render: Option<String>,
	error: Option<String>,
	errors: Option<ErrorMap>,
	toast_msg: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
	value.filter(|v| !v.is_empty())
}

impl ResponsePayload {
	/// Decodes a transport response.
	///
	/// # Errors
	///
	/// Returns [`SubmitError::MalformedResponse`] when the body is not a JSON
	/// object of the shape above, whatever the status.
	pub fn from_response(response: &RawResponse) -> Result<Self, SubmitError> {
		let body: ResponseBody = serde_json::from_str(&response.body)
			.map_err(|e| SubmitError::malformed(response.status, e.to_string()))?;

		if let Some(location) = present(body.location) {
			return Ok(Self::Redirect {
				location,
				toast: present(body.toast_msg),
			});
		}

		if response.is_success() {
			return Ok(match present(body.render) {
				Some(markup) => Self::Replace { markup },
				None => Self::Empty,
			});
		}

		Ok(Self::Errors {
			message: present(body.error),
			errors: body.errors.unwrap_or_default(),
		})
	}
}
