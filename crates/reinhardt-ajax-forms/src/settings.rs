//! Submission settings
//!
//! The defaults follow Django's form rendering conventions: inputs carry the
//! `id_<name>` auto id, their wrapper is `id_<name>_container`, and
//! non-field errors travel under `__all__`.
//!
//! Settings can be embedded in the page as JSON, e.g. in an inline
//! `<script type="application/json">` block, and parsed with
//! [`SubmitSettings::from_json`]. Missing keys keep their defaults.

use crate::error::SubmitError;
use serde::{Deserialize, Serialize};

/// Reserved error key for messages not attached to a single field.
pub const NON_FIELD_ERRORS_KEY: &str = "__all__";

/// DOM naming and request options used by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitSettings {
	/// Error key holding non-field errors.
	pub non_field_key: String,
	/// Prefix of input ids (`id_` + field name).
	pub field_id_prefix: String,
	/// Suffix appended to an input id to get its container id.
	pub container_suffix: String,
	/// Class of the block holding non-field errors.
	pub non_field_class: String,
	/// Class of the per-field error block.
	pub field_errors_class: String,
	/// Class of each message line, and of the top-level banner.
	pub message_class: String,
	/// Tag used for each message line.
	pub message_tag: String,
	/// Class added to a field container that has errors.
	pub container_error_class: String,
	/// Class added to an input that has errors.
	pub input_invalid_class: String,
	/// Send `X-Requested-With: XMLHttpRequest`.
	pub send_ajax_header: bool,
	/// Send the CSRF cookie back as `X-CSRFToken`.
	pub send_csrf_header: bool,
}

impl Default for SubmitSettings {
	fn default() -> Self {
		Self {
			non_field_key: NON_FIELD_ERRORS_KEY.to_string(),
			field_id_prefix: "id_".to_string(),
			container_suffix: "_container".to_string(),
			non_field_class: "non-field-errors".to_string(),
			field_errors_class: "errors".to_string(),
			message_class: "error".to_string(),
			message_tag: "small".to_string(),
			container_error_class: "has-error".to_string(),
			input_invalid_class: "invalid".to_string(),
			send_ajax_header: true,
			send_csrf_header: true,
		}
	}
}

impl SubmitSettings {
	/// Parses settings from a JSON object. Absent keys use the defaults.
	///
	/// # Errors
	///
	/// Returns [`SubmitError::Config`] when the input is not a JSON object
	/// of the expected shape.
	pub fn from_json(json: &str) -> Result<Self, SubmitError> {
		serde_json::from_str(json).map_err(|e| SubmitError::Config(e.to_string()))
	}

	/// Id of the input for `field`.
	pub fn input_id(&self, field: &str) -> String {
		format!("{}{}", self.field_id_prefix, field)
	}

	/// Id of the wrapper element around the input for `field`.
	pub fn container_id(&self, field: &str) -> String {
		format!("{}{}{}", self.field_id_prefix, field, self.container_suffix)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_default_ids_follow_django_auto_id() {
		let settings = SubmitSettings::default();
		assert_eq!(settings.input_id("email"), "id_email");
		assert_eq!(settings.container_id("email"), "id_email_container");
		assert_eq!(settings.non_field_key, "__all__");
	}

	#[rstest]
	fn test_from_json_partial_keeps_defaults() {
		let settings =
			SubmitSettings::from_json(r#"{"field_id_prefix": "f_", "send_csrf_header": false}"#)
				.unwrap();

		assert_eq!(settings.container_id("name"), "f_name_container");
		assert!(!settings.send_csrf_header);
		assert!(settings.send_ajax_header);
		assert_eq!(settings.message_tag, "small");
	}

	#[rstest]
	fn test_from_json_empty_object_is_default() {
		assert_eq!(
			SubmitSettings::from_json("{}").unwrap(),
			SubmitSettings::default()
		);
	}

	#[rstest]
	#[case("[]")]
	#[case(r#"{"send_ajax_header": "yes"}"#)]
	#[case("not json")]
	fn test_from_json_rejects_bad_input(#[case] input: &str) {
		let err = SubmitSettings::from_json(input).unwrap_err();
		assert!(matches!(err, SubmitError::Config(_)));
	}
}
