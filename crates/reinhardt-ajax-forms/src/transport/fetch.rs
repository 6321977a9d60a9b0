//! `fetch` transport for the browser

use super::Transport;
use crate::csrf::{CSRF_HEADER_NAME, REQUESTED_WITH_HEADER, csrf_token_from_cookie};
use crate::error::SubmitError;
use crate::payload::RawResponse;
use crate::request::SubmissionRequest;
use crate::settings::SubmitSettings;
use async_trait::async_trait;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
	FormData, Headers, Request, RequestCredentials, RequestInit, Response, Url, UrlSearchParams,
};

/// Sends the form's `FormData` with `window.fetch`.
#[derive(Debug, Clone)]
pub struct FetchTransport {
	send_ajax_header: bool,
	send_csrf_header: bool,
}

impl FetchTransport {
	/// Creates a transport sending both the AJAX and CSRF headers.
	pub fn new() -> Self {
		Self {
			send_ajax_header: true,
			send_csrf_header: true,
		}
	}

	/// Creates a transport with header options taken from `settings`.
	pub fn from_settings(settings: &SubmitSettings) -> Self {
		Self {
			send_ajax_header: settings.send_ajax_header,
			send_csrf_header: settings.send_csrf_header,
		}
	}

	fn headers(&self) -> Result<Headers, SubmitError> {
		let headers = Headers::new().map_err(to_transport)?;
		if self.send_ajax_header {
			let (name, value) = REQUESTED_WITH_HEADER;
			headers.set(name, value).map_err(to_transport)?;
		}
		if self.send_csrf_header
			&& let Some(token) = csrf_token_from_cookie()
		{
			headers
				.set(CSRF_HEADER_NAME, &token)
				.map_err(to_transport)?;
		}
		Ok(headers)
	}
}

impl Default for FetchTransport {
	fn default() -> Self {
		Self::new()
	}
}

fn to_transport(value: wasm_bindgen::JsValue) -> SubmitError {
	SubmitError::transport(format!("{:?}", value))
}

/// `action` resolved against `base`, with the text fields of `body` as its
/// query string. File fields are dropped, as for a native GET submission.
fn query_url(action: &str, base: &str, body: &FormData) -> Result<String, SubmitError> {
	let url = Url::new_with_base(action, base).map_err(to_transport)?;
	let params = UrlSearchParams::new().map_err(to_transport)?;
	if let Some(entries) = js_sys::try_iter(body).map_err(to_transport)? {
		for entry in entries {
			let entry: js_sys::Array = entry.map_err(to_transport)?.unchecked_into();
			if let (Some(name), Some(value)) = (entry.get(0).as_string(), entry.get(1).as_string())
			{
				params.append(&name, &value);
			}
		}
	}
	url.set_search(&String::from(params.to_string()));
	Ok(url.href())
}

#[async_trait(?Send)]
impl Transport<FormData> for FetchTransport {
	async fn send(&self, request: SubmissionRequest<FormData>) -> Result<RawResponse, SubmitError> {
		let window = web_sys::window().ok_or_else(|| SubmitError::transport("No window object"))?;

		let init = RequestInit::new();
		init.set_method(request.method.as_str());
		init.set_credentials(RequestCredentials::SameOrigin);
		init.set_headers(&self.headers()?);
		let url = if request.is_bodyless() {
			let base = window.location().href().map_err(to_transport)?;
			query_url(&request.action, &base, &request.body)?
		} else {
			init.set_body(&request.body);
			request.action.clone()
		};

		let fetch_request = Request::new_with_str_and_init(&url, &init).map_err(to_transport)?;

		let response: Response = JsFuture::from(window.fetch_with_request(&fetch_request))
			.await
			.map_err(to_transport)?
			.dyn_into()
			.map_err(to_transport)?;

		let text = JsFuture::from(response.text().map_err(to_transport)?)
			.await
			.map_err(to_transport)?;

		Ok(RawResponse::new(
			response.status(),
			text.as_string().unwrap_or_default(),
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use wasm_bindgen_test::*;

	wasm_bindgen_test_configure!(run_in_browser);

	#[wasm_bindgen_test]
	fn test_query_url_replaces_query_with_text_fields() {
		let body = FormData::new().unwrap();
		body.append_with_str("q", "borrow checker").unwrap();
		body.append_with_str("page", "2").unwrap();

		let url = query_url("/search/?page=1", "https://example.com/home", &body).unwrap();

		assert_eq!(url, "https://example.com/search/?q=borrow+checker&page=2");
	}

	#[wasm_bindgen_test]
	fn test_query_url_without_fields_clears_query() {
		let body = FormData::new().unwrap();

		let url = query_url("?stale=1", "https://example.com/search/", &body).unwrap();

		assert_eq!(url, "https://example.com/search/");
	}
}
