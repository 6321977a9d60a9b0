//! Submission requests
//!
//! A [`SubmissionRequest`] is built when a watched form is submitted and
//! lives only for the duration of one network call. The body type depends on
//! the platform: the browser hands the form straight to `FormData` so file
//! inputs survive untouched, while native code carries a [`FormBody`].

use bytes::Bytes;
use http::Method;

/// One request derived from a form's `action`, `method` and fields.
#[derive(Debug, Clone)]
pub struct SubmissionRequest<B> {
	/// Id of the form the request was built from.
	pub form_id: String,
	/// Target URL from the form's `action` attribute. Empty means the current
	/// document URL.
	pub action: String,
	/// HTTP method from the form's `method` attribute.
	pub method: Method,
	/// Encoded form fields.
	pub body: B,
}

impl<B> SubmissionRequest<B> {
	/// Builds a request from raw attribute values.
	///
	/// A missing `action` targets the current document, a missing or unknown
	/// `method` falls back to `GET` the way browsers treat `<form>` elements.
	pub fn from_attributes(
		form_id: impl Into<String>,
		action: Option<String>,
		method: Option<String>,
		body: B,
	) -> Self {
		Self {
			form_id: form_id.into(),
			action: action.unwrap_or_default(),
			method: parse_method(method.as_deref()),
			body,
		}
	}

	/// Whether the method forbids a request body.
	pub fn is_bodyless(&self) -> bool {
		self.method == Method::GET || self.method == Method::HEAD
	}
}

fn parse_method(raw: Option<&str>) -> Method {
	let Some(raw) = raw.map(str::trim).filter(|m| !m.is_empty()) else {
		return Method::GET;
	};
	match raw.to_ascii_uppercase().as_str() {
		"POST" => Method::POST,
		"PUT" => Method::PUT,
		"PATCH" => Method::PATCH,
		"DELETE" => Method::DELETE,
		"HEAD" => Method::HEAD,
		_ => Method::GET,
	}
}

/// Value of a single form entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
	/// Plain text input value
	Text(String),
	/// Uploaded file
	File {
		/// File name reported to the server
		filename: String,
		/// MIME type, if known
		content_type: Option<String>,
		/// File contents
		data: Bytes,
	},
}

/// A named form entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormEntry {
	/// Field name (`name` attribute)
	pub name: String,
	/// Field value
	pub value: FieldValue,
}

/// Ordered form fields, repeated names allowed (multi-selects, checkboxes).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody {
	entries: Vec<FormEntry>,
}

impl FormBody {
	/// Creates an empty body.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a text entry.
	pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.push(name, FieldValue::Text(value.into()));
		self
	}

	/// Appends a file entry.
	pub fn file(
		mut self,
		name: impl Into<String>,
		filename: impl Into<String>,
		content_type: Option<&str>,
		data: impl Into<Bytes>,
	) -> Self {
		self.push(
			name,
			FieldValue::File {
				filename: filename.into(),
				content_type: content_type.map(str::to_string),
				data: data.into(),
			},
		);
		self
	}

	/// Appends an entry in place.
	pub fn push(&mut self, name: impl Into<String>, value: FieldValue) {
		self.entries.push(FormEntry {
			name: name.into(),
			value,
		});
	}

	/// Returns all entries in insertion order.
	pub fn entries(&self) -> &[FormEntry] {
		&self.entries
	}

	/// Returns the first value for `name`.
	pub fn get(&self, name: &str) -> Option<&FieldValue> {
		self.entries
			.iter()
			.find(|entry| entry.name == name)
			.map(|entry| &entry.value)
	}

	/// Text entries as `(name, value)` pairs, suitable for a query string.
	pub fn text_pairs(&self) -> Vec<(&str, &str)> {
		self.entries
			.iter()
			.filter_map(|entry| match &entry.value {
				FieldValue::Text(value) => Some((entry.name.as_str(), value.as_str())),
				FieldValue::File { .. } => None,
			})
			.collect()
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true if the body has no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(Some("post"), Method::POST)]
	#[case(Some(" PATCH "), Method::PATCH)]
	#[case(Some("delete"), Method::DELETE)]
	#[case(Some(""), Method::GET)]
	#[case(Some("dialog"), Method::GET)]
	#[case(None, Method::GET)]
	fn test_method_from_attribute(#[case] raw: Option<&str>, #[case] expected: Method) {
		let request =
			SubmissionRequest::from_attributes("f", None, raw.map(str::to_string), FormBody::new());
		assert_eq!(request.method, expected);
	}

	#[rstest]
	fn test_missing_action_targets_current_document() {
		let request = SubmissionRequest::from_attributes("f", None, None, FormBody::new());
		assert_eq!(request.action, "");
		assert!(request.is_bodyless());
	}

	#[rstest]
	fn test_form_body_keeps_order_and_files() {
		let body = FormBody::new()
			.text("tags", "rust")
			.file("resume", "cv.pdf", Some("application/pdf"), &b"%PDF"[..])
			.text("tags", "wasm");

		assert_eq!(body.len(), 3);
		assert_eq!(body.text_pairs(), vec![("tags", "rust"), ("tags", "wasm")]);
		assert_eq!(body.get("tags"), Some(&FieldValue::Text("rust".into())));
		assert!(matches!(
			body.get("resume"),
			Some(FieldValue::File { filename, .. }) if filename == "cv.pdf"
		));
	}
}
