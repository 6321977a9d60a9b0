//! CSRF token lookup for AJAX submissions
//!
//! Django forms already carry `csrfmiddlewaretoken` as a hidden input, which
//! travels inside the multipart body. Views that read the header instead get
//! the `csrftoken` cookie echoed back as `X-CSRFToken`.

/// The cookie name used by Django for CSRF tokens.
pub const CSRF_COOKIE_NAME: &str = "csrftoken";

/// The header name used to send CSRF tokens in AJAX requests.
pub const CSRF_HEADER_NAME: &str = "X-CSRFToken";

/// Header that marks a request as AJAX for `request.is_ajax()`.
pub const REQUESTED_WITH_HEADER: (&str, &str) = ("X-Requested-With", "XMLHttpRequest");

/// Retrieves the CSRF token from the document cookie.
#[cfg(target_arch = "wasm32")]
pub fn csrf_token_from_cookie() -> Option<String> {
	use wasm_bindgen::JsCast;
	use web_sys::{HtmlDocument, window};

	let document = window()?.document()?;
	let html_doc = document.dyn_ref::<HtmlDocument>()?;
	let cookie_str = html_doc.cookie().ok()?;

	parse_cookie_value(&cookie_str, CSRF_COOKIE_NAME)
}

/// Parses a cookie value from a `name1=value1; name2=value2` string.
///
/// Empty values are treated as absent.
pub fn parse_cookie_value(cookie_str: &str, name: &str) -> Option<String> {
	cookie_str
		.split(';')
		.filter_map(|part| part.split_once('='))
		.find(|(key, _)| key.trim() == name)
		.map(|(_, value)| value.trim().to_string())
		.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_parse_cookie_value() {
		let cookie_str = "sessionid=abc123; csrftoken=xyz789; other=value";
		assert_eq!(
			parse_cookie_value(cookie_str, "csrftoken"),
			Some("xyz789".to_string())
		);
		assert_eq!(
			parse_cookie_value(cookie_str, "sessionid"),
			Some("abc123".to_string())
		);
		assert_eq!(parse_cookie_value(cookie_str, "nonexistent"), None);
	}

	#[rstest]
	fn test_parse_cookie_value_with_spaces() {
		let cookie_str = " csrftoken = token123 ; other = value ";
		assert_eq!(
			parse_cookie_value(cookie_str, "csrftoken"),
			Some("token123".to_string())
		);
	}

	#[rstest]
	#[case("csrftoken=")]
	#[case("csrftoken")]
	#[case("")]
	fn test_parse_cookie_value_absent(#[case] cookie_str: &str) {
		assert_eq!(parse_cookie_value(cookie_str, CSRF_COOKIE_NAME), None);
	}
}
