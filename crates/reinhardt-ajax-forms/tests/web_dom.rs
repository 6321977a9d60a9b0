//! Browser tests for `WebDom` driven through the controller
//!
//! Run with `wasm-pack test --headless --firefox`.

#[cfg(target_arch = "wasm32")]
mod web_dom_tests {
	use async_trait::async_trait;
	use reinhardt_ajax_forms::{
		ErrorMap, FormSubmitController, Navigator, NoopHooks, RawResponse, SubmissionRequest,
		SubmitError, SubmitOutcome, SubmitSettings, Transport, WebDom,
	};
	use std::cell::Cell;
	use std::rc::Rc;
	use wasm_bindgen::JsValue;
	use wasm_bindgen_futures::JsFuture;
	use wasm_bindgen_test::*;
	use web_sys::{Element, Event, EventInit, FormData};

	wasm_bindgen_test_configure!(run_in_browser);

	/// Answers every request with the same response.
	struct Answer {
		status: u16,
		body: &'static str,
		sent: Rc<Cell<usize>>,
	}

	#[async_trait(?Send)]
	impl Transport<FormData> for Answer {
		async fn send(
			&self,
			_request: SubmissionRequest<FormData>,
		) -> Result<RawResponse, SubmitError> {
			self.sent.set(self.sent.get() + 1);
			Ok(RawResponse::new(self.status, self.body))
		}
	}

	struct StayHere;

	impl Navigator for StayHere {
		fn navigate(&self, _url: &str) -> Result<(), SubmitError> {
			Ok(())
		}
	}

	type WebController = FormSubmitController<WebDom, Answer, StayHere, NoopHooks>;

	fn controller(status: u16, body: &'static str) -> WebController {
		controller_counting(status, body, Rc::default())
	}

	fn controller_counting(
		status: u16,
		body: &'static str,
		sent: Rc<Cell<usize>>,
	) -> WebController {
		FormSubmitController::new(
			WebDom::new().unwrap(),
			Answer { status, body, sent },
			StayHere,
			NoopHooks,
			SubmitSettings::default(),
		)
	}

	/// Mounts `div > div.wrap > form#<id>` with one `email` field.
	fn mount(form_id: &str) -> Element {
		let document = web_sys::window().unwrap().document().unwrap();
		let root = document.create_element("div").unwrap();
		root.set_inner_html(&format!(
			r#"<div class="wrap"><form id="{}" action="/save/" method="post"><div id="id_email_container"><input id="id_email" name="email"></div></form></div>"#,
			form_id
		));
		document.body().unwrap().append_child(&root).unwrap();
		root
	}

	fn select(root: &Element, selector: &str) -> Option<Element> {
		root.query_selector(selector).unwrap()
	}

	/// Dispatches a cancelable, bubbling `submit` event at `form` and returns it.
	fn submit_event(form: &Element) -> Event {
		let init = EventInit::new();
		init.set_bubbles(true);
		init.set_cancelable(true);
		let event = Event::new_with_event_init_dict("submit", &init).unwrap();
		form.dispatch_event(&event).unwrap();
		event
	}

	/// Lets queued microtasks, spawned submissions included, run.
	async fn next_tick() {
		JsFuture::from(js_sys::Promise::resolve(&JsValue::NULL))
			.await
			.unwrap();
	}

	async fn settle(controller: &WebController, form_id: &str) {
		for _ in 0..64 {
			if !controller.is_in_flight(form_id) {
				return;
			}
			next_tick().await;
		}
		panic!("submission of #{} never settled", form_id);
	}

	#[wasm_bindgen_test]
	async fn test_submit_default_is_cancelled_even_while_in_flight() {
		let root = mount("wasm-cancel");
		let sent = Rc::new(Cell::new(0));
		let controller = controller_counting(200, r#"{"success": true}"#, sent.clone());
		controller.initialize(["wasm-cancel"]);
		let form = select(&root, "#wasm-cancel").unwrap();

		let first = submit_event(&form);
		assert!(first.default_prevented());
		assert!(controller.is_in_flight("wasm-cancel"));

		let second = submit_event(&form);
		assert!(second.default_prevented());

		settle(&controller, "wasm-cancel").await;
		assert_eq!(sent.get(), 1);

		let third = submit_event(&form);
		assert!(third.default_prevented());
		settle(&controller, "wasm-cancel").await;
		assert_eq!(sent.get(), 2);
		root.remove();
	}

	#[wasm_bindgen_test]
	fn test_unregistered_form_is_not_cancelled() {
		let root = mount("wasm-plain");
		let controller = controller(200, "{}");
		controller.initialize(["wasm-other"]);
		let form = select(&root, "#wasm-plain").unwrap();

		let event = submit_event(&form);

		assert!(!event.default_prevented());
		root.remove();
	}

	#[wasm_bindgen_test]
	fn test_errors_are_text_and_clear_fully() {
		let root = mount("wasm-errors");
		let controller = controller(400, "{}");
		let errors: ErrorMap =
			serde_json::from_str(r#"{"__all__": ["<b>A</b>"], "email": ["Required"]}"#).unwrap();

		controller
			.show_errors("wasm-errors", Some("Server error"), &errors)
			.unwrap();

		let block = select(&root, "#wasm-errors > .non-field-errors").unwrap();
		assert_eq!(block.text_content().as_deref(), Some("<b>A</b>"));
		assert!(select(&block, "b").is_none());
		let container = select(&root, "#id_email_container").unwrap();
		assert!(container.class_list().contains("has-error"));
		assert!(select(&root, "#id_email.invalid").is_some());
		assert_eq!(
			select(&container, ".errors > small.error")
				.unwrap()
				.text_content()
				.as_deref(),
			Some("Required")
		);
		let banner = select(&root, ".wrap").unwrap().first_element_child().unwrap();
		assert_eq!(banner.text_content().as_deref(), Some("Server error"));

		controller.clear_errors("wasm-errors").unwrap();
		controller.clear_errors("wasm-errors").unwrap();

		assert!(
			select(&root, ".error, .errors, .non-field-errors, .has-error, .invalid").is_none()
		);
		root.remove();
	}

	#[wasm_bindgen_test]
	fn test_field_lookup_is_scoped_to_the_form() {
		let first = mount("wasm-first");
		let second = mount("wasm-second");
		let controller = controller(400, "{}");
		let errors: ErrorMap = serde_json::from_str(r#"{"email": ["Taken"]}"#).unwrap();

		controller
			.show_errors("wasm-second", None, &errors)
			.unwrap();

		assert!(select(&first, ".has-error").is_none());
		assert!(select(&second, "#id_email_container.has-error").is_some());
		first.remove();
		second.remove();
	}

	#[wasm_bindgen_test]
	async fn test_render_swaps_markup_and_rebinds() {
		let root = mount("wasm-render");
		let controller = controller(
			200,
			r#"{"render": "<p class=\"done\">Saved</p><form id=\"wasm-render\"></form>"}"#,
		);
		controller.initialize(["wasm-render"]);

		let old_form = select(&root, "#wasm-render").unwrap();

		let outcome = controller.submit("wasm-render").await.unwrap();

		assert_eq!(outcome, SubmitOutcome::Replaced { rebound: true });
		assert!(!submit_event(&old_form).default_prevented());
		let new_form = select(&root, "#wasm-render").unwrap();
		assert!(submit_event(&new_form).default_prevented());
		settle(&controller, "wasm-render").await;
		assert!(select(&root, ".wrap > p.done").is_some());
		assert!(select(&root, "#id_email").is_none());
		assert!(select(&root, ".wrap > form#wasm-render").is_some());
		assert!(controller.is_bound("wasm-render"));
		root.remove();
	}
}
