//! Form submission controller
//!
//! [`FormSubmitController`] takes over the submit event of a set of forms:
//!
//! ```text
//! submit ──▶ preventDefault ──▶ in flight? ──yes──▶ ignore
//!                                   │no
//!                                   ▼
//!                             clear errors ──▶ FormData ──▶ Transport
//!                                                              │
//!         ┌──────────────────┬─────────────────┬───────────────┘
//!         ▼                  ▼                 ▼
//!     location          render (2xx)      error / errors (4xx, 5xx)
//!     navigate     swap parent contents,   banner above the form,
//!                  rebind #id, reattach    annotate fields
//!                  global handlers
//! ```
//!
//! At most one request per form is in flight: submit events arriving before
//! the response are cancelled and dropped.

use crate::dom::FormDom;
use crate::error::SubmitError;
use crate::navigation::{Navigator, SubmitHooks};
use crate::payload::{ErrorMap, ResponsePayload};
use crate::request::SubmissionRequest;
use crate::runtime::spawn_local;
use crate::settings::SubmitSettings;
use crate::transport::Transport;
use crate::{debug_log, error_log, info_log, warn_log};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// How a submission was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
	/// The browser was sent to `location`.
	Navigated {
		/// Target URL
		location: String,
	},
	/// The form's container was replaced with server markup.
	Replaced {
		/// Whether the new markup contained the form again and its submit
		/// event was intercepted.
		rebound: bool,
	},
	/// Validation errors were rendered into the form.
	ErrorsRendered {
		/// Whether a top-level banner was shown
		banner: bool,
		/// Number of non-field messages
		non_field: usize,
		/// Number of fields annotated
		fields: usize,
	},
	/// Successful response with nothing to apply.
	Unchanged,
	/// Another submission of the same form was still in flight.
	Ignored,
}

/// Releases the in-flight mark of a form when dropped.
struct InFlight {
	forms: Rc<RefCell<HashSet<String>>>,
	form_id: String,
}

impl Drop for InFlight {
	fn drop(&mut self) {
		self.forms.borrow_mut().remove(&self.form_id);
	}
}

struct ControllerInner<D, T, N, H> {
	dom: D,
	transport: T,
	navigator: N,
	hooks: H,
	settings: SubmitSettings,
	bound: RefCell<HashSet<String>>,
	in_flight: Rc<RefCell<HashSet<String>>>,
}

/// Intercepts form submissions and reconciles the page with the response.
///
/// Cloning is cheap; clones share the same state.
///
/// # Example
///
/// ```ignore
/// use reinhardt_ajax_forms::{
///     BrowserNavigator, FetchTransport, FormSubmitController, NoopHooks, SubmitSettings, WebDom,
/// };
///
/// let settings = SubmitSettings::default();
/// let controller = FormSubmitController::new(
///     WebDom::new()?,
///     FetchTransport::from_settings(&settings),
///     BrowserNavigator,
///     NoopHooks,
///     settings,
/// );
/// controller.initialize(["login-form", "signup-form"]);
/// ```
pub struct FormSubmitController<D, T, N, H> {
	inner: Rc<ControllerInner<D, T, N, H>>,
}

impl<D, T, N, H> Clone for FormSubmitController<D, T, N, H> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<D, T, N, H> FormSubmitController<D, T, N, H>
where
	D: FormDom + 'static,
	T: Transport<D::Body> + 'static,
	N: Navigator + 'static,
	H: SubmitHooks + 'static,
{
	/// Creates a controller. No form is watched until
	/// [`initialize`](Self::initialize) is called.
	pub fn new(dom: D, transport: T, navigator: N, hooks: H, settings: SubmitSettings) -> Self {
		Self {
			inner: Rc::new(ControllerInner {
				dom,
				transport,
				navigator,
				hooks,
				settings,
				bound: RefCell::new(HashSet::new()),
				in_flight: Rc::new(RefCell::new(HashSet::new())),
			}),
		}
	}

	/// Settings in use.
	pub fn settings(&self) -> &SubmitSettings {
		&self.inner.settings
	}

	/// The DOM the controller works on.
	pub fn dom(&self) -> &D {
		&self.inner.dom
	}

	/// Whether the form with this id currently has an interceptor.
	pub fn is_bound(&self, form_id: &str) -> bool {
		self.inner.bound.borrow().contains(form_id)
	}

	/// Whether a submission of this form is waiting for its response.
	pub fn is_in_flight(&self, form_id: &str) -> bool {
		self.inner.in_flight.borrow().contains(form_id)
	}

	/// Intercepts the submit event of every form in `form_ids`.
	///
	/// Ids that are already bound are skipped, so calling this again with an
	/// overlapping list never stacks handlers. Ids with no matching element
	/// are logged and stay unbound.
	pub fn initialize<I>(&self, form_ids: I)
	where
		I: IntoIterator,
		I::Item: AsRef<str>,
	{
		for form_id in form_ids {
			let form_id = form_id.as_ref();
			if self.is_bound(form_id) {
				debug_log!("Form #{} already bound, skipping", form_id);
				continue;
			}
			let Some(form) = self.inner.dom.element_by_id(form_id) else {
				warn_log!("Form #{} not found, not bound", form_id);
				continue;
			};
			match self.bind(form_id, &form) {
				Ok(()) => info_log!("Bound submit interceptor to #{}", form_id),
				Err(e) => error_log!("Failed to bind #{}: {}", form_id, e),
			}
		}
	}

	/// Submits the form now, as its submit event would.
	///
	/// Returns [`SubmitOutcome::Ignored`] if a previous submission of the same
	/// form has not been resolved yet.
	///
	/// # Errors
	///
	/// Transport failures and responses that are not the expected JSON are
	/// returned as is; the form keeps its cleared state.
	pub async fn submit(&self, form_id: &str) -> Result<SubmitOutcome, SubmitError> {
		let Some(guard) = self.begin(form_id) else {
			return Ok(SubmitOutcome::Ignored);
		};
		self.run(form_id, guard).await
	}

	/// Removes every error annotation from the form and the banner above it.
	///
	/// Idempotent.
	pub fn clear_errors(&self, form_id: &str) -> Result<(), SubmitError> {
		let form = self.form(form_id)?;
		self.clear_form(&form)
	}

	/// Replaces the form's annotations with `message` and `errors`.
	pub fn show_errors(
		&self,
		form_id: &str,
		message: Option<&str>,
		errors: &ErrorMap,
	) -> Result<SubmitOutcome, SubmitError> {
		let form = self.form(form_id)?;
		self.clear_form(&form)?;
		self.render_errors(&form, message, errors)
	}

	fn form(&self, form_id: &str) -> Result<D::Element, SubmitError> {
		self.inner
			.dom
			.element_by_id(form_id)
			.ok_or_else(|| SubmitError::FormNotFound(form_id.to_string()))
	}

	fn bind(&self, form_id: &str, form: &D::Element) -> Result<(), SubmitError> {
		let controller = self.clone();
		let id = form_id.to_string();
		self.inner
			.dom
			.intercept_submit(form, Rc::new(move || controller.on_submit_event(&id)))?;
		self.inner.bound.borrow_mut().insert(form_id.to_string());
		Ok(())
	}

	fn on_submit_event(&self, form_id: &str) {
		let Some(guard) = self.begin(form_id) else {
			info_log!("Submission of #{} already in flight, ignoring", form_id);
			return;
		};
		let controller = self.clone();
		let form_id = form_id.to_string();
		spawn_local(async move {
			match controller.run(&form_id, guard).await {
				Ok(outcome) => debug_log!("Submission of #{} resolved: {:?}", form_id, outcome),
				Err(e) => error_log!("Submission of #{} failed: {}", form_id, e),
			}
		});
	}

	fn begin(&self, form_id: &str) -> Option<InFlight> {
		let forms = Rc::clone(&self.inner.in_flight);
		if !forms.borrow_mut().insert(form_id.to_string()) {
			return None;
		}
		Some(InFlight {
			forms,
			form_id: form_id.to_string(),
		})
	}

	async fn run(&self, form_id: &str, _guard: InFlight) -> Result<SubmitOutcome, SubmitError> {
		let dom = &self.inner.dom;
		let form = self.form(form_id)?;
		self.clear_form(&form)?;

		let request = SubmissionRequest::from_attributes(
			form_id,
			dom.attribute(&form, "action"),
			dom.attribute(&form, "method"),
			dom.form_body(&form)?,
		);
		debug_log!(
			"Submitting #{}: {} '{}'",
			form_id,
			request.method,
			request.action
		);

		let response = self.inner.transport.send(request).await?;
		let payload = ResponsePayload::from_response(&response)?;
		self.apply(form_id, &form, payload)
	}

	fn apply(
		&self,
		form_id: &str,
		form: &D::Element,
		payload: ResponsePayload,
	) -> Result<SubmitOutcome, SubmitError> {
		let inner = &self.inner;
		match payload {
			ResponsePayload::Redirect { location, toast } => {
				if let Some(toast) = toast {
					inner.hooks.toast(&toast);
				}
				inner.navigator.navigate(&location)?;
				Ok(SubmitOutcome::Navigated { location })
			}
			ResponsePayload::Replace { markup } => {
				let container = inner.dom.parent(form).ok_or_else(|| {
					SubmitError::dom(format!("form '#{}' has no parent container", form_id))
				})?;
				inner.dom.replace_contents(&container, &markup);

				let rebound = match inner.dom.find_by_id(&container, form_id) {
					Some(new_form) => {
						self.bind(form_id, &new_form)?;
						true
					}
					None => {
						debug_log!("Replacement markup has no #{}, unbinding", form_id);
						inner.bound.borrow_mut().remove(form_id);
						false
					}
				};
				inner.hooks.reattach_global_handlers();
				Ok(SubmitOutcome::Replaced { rebound })
			}
			ResponsePayload::Errors { message, errors } => {
				self.render_errors(form, message.as_deref(), &errors)
			}
			ResponsePayload::Empty => {
				warn_log!("Response for #{} had neither location nor render", form_id);
				Ok(SubmitOutcome::Unchanged)
			}
		}
	}

	fn clear_form(&self, form: &D::Element) -> Result<(), SubmitError> {
		let dom = &self.inner.dom;
		let settings = &self.inner.settings;

		for class in [&settings.non_field_class, &settings.field_errors_class] {
			for block in dom.find_by_class(form, class) {
				dom.remove(&block);
			}
		}
		for class in [
			&settings.container_error_class,
			&settings.input_invalid_class,
		] {
			for element in dom.find_by_class(form, class) {
				dom.remove_class(&element, class)?;
			}
		}
		// Only direct children: sibling forms keep their own message lines.
		let host = self.banner_host(form);
		for banner in dom.find_by_class(&host, &settings.message_class) {
			if dom.parent(&banner).as_ref() == Some(&host) {
				dom.remove(&banner);
			}
		}
		Ok(())
	}

	/// Element the top-level banner is prepended to: the form's parent, or
	/// the form itself when detached.
	fn banner_host(&self, form: &D::Element) -> D::Element {
		self.inner.dom.parent(form).unwrap_or_else(|| form.clone())
	}

	fn render_errors(
		&self,
		form: &D::Element,
		message: Option<&str>,
		errors: &ErrorMap,
	) -> Result<SubmitOutcome, SubmitError> {
		let dom = &self.inner.dom;
		let settings = &self.inner.settings;

		let banner = match message {
			Some(message) => {
				let line = self.message_line(message)?;
				dom.prepend_child(&self.banner_host(form), &line)?;
				true
			}
			None => false,
		};

		let mut non_field = 0;
		if let Some(messages) = errors.get(&settings.non_field_key) {
			let block = self.error_block(&settings.non_field_class, messages)?;
			dom.prepend_child(form, &block)?;
			non_field = messages.len();
		}

		let mut fields = 0;
		for (field, messages) in errors
			.iter()
			.filter(|(field, _)| **field != settings.non_field_key)
		{
			let Some(container) = dom.find_by_id(form, &settings.container_id(field)) else {
				warn_log!("No container for field '{}', dropping its errors", field);
				continue;
			};
			dom.add_class(&container, &settings.container_error_class)?;
			if let Some(input) = dom.find_by_id(form, &settings.input_id(field)) {
				dom.add_class(&input, &settings.input_invalid_class)?;
			}
			let block = self.error_block(&settings.field_errors_class, messages)?;
			dom.append_child(&container, &block)?;
			fields += 1;
		}

		Ok(SubmitOutcome::ErrorsRendered {
			banner,
			non_field,
			fields,
		})
	}

	fn message_line(&self, text: &str) -> Result<D::Element, SubmitError> {
		let dom = &self.inner.dom;
		let line = dom.create_element(&self.inner.settings.message_tag)?;
		dom.add_class(&line, &self.inner.settings.message_class)?;
		dom.set_text(&line, text);
		Ok(line)
	}

	fn error_block(&self, class: &str, messages: &[String]) -> Result<D::Element, SubmitError> {
		let dom = &self.inner.dom;
		let block = dom.create_element("div")?;
		dom.add_class(&block, class)?;
		for message in messages {
			let line = self.message_line(message)?;
			dom.append_child(&block, &line)?;
		}
		Ok(block)
	}
}
