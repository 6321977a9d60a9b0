//! JavaScript entry point
//!
//! Templates call `initForms` once per page with the ids of the forms to
//! take over, optionally with settings and a function restoring page-wide
//! listeners after a markup swap:
//!
//! ```js
//! import init, { initForms } from "./reinhardt_ajax_forms.js";
//!
//! await init();
//! initForms(["login-form", "signup-form"], null, () => bindDropdowns());
//! ```
//!
//! The controller is kept for the lifetime of the page, so later calls add
//! forms to the same bound set instead of stacking listeners.

use crate::controller::FormSubmitController;
use crate::dom::WebDom;
use crate::error::SubmitError;
use crate::navigation::{BrowserNavigator, FnHooks, SubmitHooks};
use crate::settings::SubmitSettings;
use crate::transport::FetchTransport;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

/// Controller wired to the browser DOM, `fetch` and `window.location`.
pub type BrowserFormController<H> =
	FormSubmitController<WebDom, FetchTransport, BrowserNavigator, H>;

type JsHooks = FnHooks<Box<dyn Fn()>>;

thread_local! {
	static CONTROLLER: RefCell<Option<BrowserFormController<JsHooks>>> = const { RefCell::new(None) };
}

/// Builds a browser controller.
pub fn browser_controller<H: SubmitHooks + 'static>(
	settings: SubmitSettings,
	hooks: H,
) -> Result<BrowserFormController<H>, SubmitError> {
	let transport = FetchTransport::from_settings(&settings);
	Ok(FormSubmitController::new(
		WebDom::new()?,
		transport,
		BrowserNavigator,
		hooks,
		settings,
	))
}

fn js_hooks(reattach: Option<js_sys::Function>) -> JsHooks {
	let call: Box<dyn Fn()> = Box::new(move || {
		if let Some(reattach) = &reattach
			&& let Err(e) = reattach.call0(&JsValue::NULL)
		{
			crate::error_log!("reattach handler threw: {:?}", e);
		}
	});
	FnHooks::new(call)
}

/// Takes over the submit event of the forms with the given ids.
///
/// `settings_json` and `reattach` are only read on the first call.
#[wasm_bindgen(js_name = initForms)]
pub fn init_forms(
	form_ids: Vec<String>,
	settings_json: Option<String>,
	reattach: Option<js_sys::Function>,
) -> Result<(), JsValue> {
	#[cfg(feature = "console_error_panic_hook")]
	console_error_panic_hook::set_once();

	let controller = CONTROLLER.with(|slot| -> Result<_, SubmitError> {
		let mut slot = slot.borrow_mut();
		if let Some(controller) = slot.as_ref() {
			return Ok(controller.clone());
		}
		let settings = match settings_json.as_deref() {
			Some(json) => SubmitSettings::from_json(json)?,
			None => SubmitSettings::default(),
		};
		let controller = browser_controller(settings, js_hooks(reattach))?;
		*slot = Some(controller.clone());
		Ok(controller)
	});

	let controller = controller.map_err(|e| JsValue::from_str(&e.to_string()))?;
	controller.initialize(&form_ids);
	Ok(())
}
