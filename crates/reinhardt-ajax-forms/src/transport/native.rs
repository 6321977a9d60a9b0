//! `reqwest` transport for native targets

use super::Transport;
use crate::csrf::{CSRF_HEADER_NAME, REQUESTED_WITH_HEADER};
use crate::error::SubmitError;
use crate::payload::RawResponse;
use crate::request::{FieldValue, FormBody, SubmissionRequest};
use crate::settings::SubmitSettings;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use url::Url;

/// Sends a [`FormBody`] as `multipart/form-data`.
///
/// Form actions are relative, so every request is resolved against
/// `base_url`, the URL of the page the form was served on.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
	client: reqwest::Client,
	base_url: Url,
	csrf_token: Option<String>,
	send_ajax_header: bool,
}

impl ReqwestTransport {
	/// Creates a transport resolving actions against `base_url`.
	///
	/// # Errors
	///
	/// Returns [`SubmitError::Transport`] if `base_url` is not absolute.
	pub fn new(base_url: &str) -> Result<Self, SubmitError> {
		let base_url = Url::parse(base_url).map_err(|e| SubmitError::transport(e.to_string()))?;
		Ok(Self {
			client: reqwest::Client::new(),
			base_url,
			csrf_token: None,
			send_ajax_header: true,
		})
	}

	/// Uses an existing client (cookie store, timeouts, ...).
	pub fn with_client(mut self, client: reqwest::Client) -> Self {
		self.client = client;
		self
	}

	/// Sends `token` as `X-CSRFToken` on every request.
	pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
		self.csrf_token = Some(token.into());
		self
	}

	/// Applies the header options from `settings`.
	pub fn with_settings(mut self, settings: &SubmitSettings) -> Self {
		self.send_ajax_header = settings.send_ajax_header;
		if !settings.send_csrf_header {
			self.csrf_token = None;
		}
		self
	}

	fn resolve(&self, action: &str) -> Result<Url, SubmitError> {
		self.base_url
			.join(action)
			.map_err(|e| SubmitError::transport(format!("invalid action '{}': {}", action, e)))
	}
}

fn multipart(body: FormBody) -> Result<Form, SubmitError> {
	let mut form = Form::new();
	for entry in body.entries().iter().cloned() {
		form = match entry.value {
			FieldValue::Text(value) => form.text(entry.name, value),
			FieldValue::File {
				filename,
				content_type,
				data,
			} => {
				let mut part = Part::bytes(data.to_vec()).file_name(filename);
				if let Some(content_type) = content_type {
					part = part
						.mime_str(&content_type)
						.map_err(|e| SubmitError::transport(e.to_string()))?;
				}
				form.part(entry.name, part)
			}
		};
	}
	Ok(form)
}

#[async_trait(?Send)]
impl Transport<FormBody> for ReqwestTransport {
	async fn send(&self, request: SubmissionRequest<FormBody>) -> Result<RawResponse, SubmitError> {
		let mut url = self.resolve(&request.action)?;
		let bodyless = request.is_bodyless();
		if bodyless {
			// The form's fields replace the action's own query.
			url.set_query(None);
		}

		let mut builder = self.client.request(request.method, url);
		if self.send_ajax_header {
			let (name, value) = REQUESTED_WITH_HEADER;
			builder = builder.header(name, value);
		}
		if let Some(token) = &self.csrf_token {
			builder = builder.header(CSRF_HEADER_NAME, token);
		}
		builder = if bodyless {
			builder.query(&request.body.text_pairs())
		} else {
			builder.multipart(multipart(request.body)?)
		};

		let response = builder
			.send()
			.await
			.map_err(|e| SubmitError::transport(e.to_string()))?;
		let status = response.status().as_u16();
		let body = response
			.text()
			.await
			.map_err(|e| SubmitError::transport(e.to_string()))?;

		Ok(RawResponse::new(status, body))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("/accounts/signup/", "http://testserver/accounts/signup/")]
	#[case("", "http://testserver/profile/edit")]
	#[case("save", "http://testserver/profile/save")]
	#[case("https://other.example/x", "https://other.example/x")]
	fn test_resolve_action(#[case] action: &str, #[case] expected: &str) {
		let transport = ReqwestTransport::new("http://testserver/profile/edit").unwrap();
		assert_eq!(transport.resolve(action).unwrap().as_str(), expected);
	}

	#[rstest]
	fn test_relative_base_url_rejected() {
		let err = ReqwestTransport::new("/profile/edit").unwrap_err();
		assert!(matches!(err, SubmitError::Transport(_)));
	}

	#[rstest]
	fn test_settings_can_drop_csrf_header() {
		let settings = SubmitSettings {
			send_csrf_header: false,
			..SubmitSettings::default()
		};
		let transport = ReqwestTransport::new("http://testserver/")
			.unwrap()
			.with_csrf_token("abc")
			.with_settings(&settings);
		assert!(transport.csrf_token.is_none());
	}

	#[rstest]
	fn test_multipart_rejects_bad_mime() {
		let body = FormBody::new().file("avatar", "a.png", Some("not a mime"), &b"png"[..]);
		assert!(multipart(body).is_err());
	}
}
