//! `web-sys` backed DOM

use super::{FormDom, SubmitHandler};
use crate::error::SubmitError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, FormData, HtmlFormElement};

type SubmitListener = Closure<dyn FnMut(Event)>;

/// Browser DOM.
///
/// Submit listeners are owned here, one per form id. Clones share them.
#[derive(Debug, Clone)]
pub struct WebDom {
	document: Document,
	listeners: Rc<RefCell<HashMap<String, (Element, SubmitListener)>>>,
}

impl WebDom {
	/// Wraps the current window's document.
	pub fn new() -> Result<Self, SubmitError> {
		let document = web_sys::window()
			.and_then(|window| window.document())
			.ok_or_else(|| SubmitError::dom("No document object"))?;
		Ok(Self::with_document(document))
	}

	/// Wraps an explicit document.
	pub fn with_document(document: Document) -> Self {
		Self {
			document,
			listeners: Rc::default(),
		}
	}
}

/// `[id="..."]` selector matching `id` literally.
fn id_selector(id: &str) -> String {
	format!("[id=\"{}\"]", id.replace('\\', "\\\\").replace('"', "\\\""))
}

impl FormDom for WebDom {
	type Element = Element;
	type Body = FormData;

	fn element_by_id(&self, id: &str) -> Option<Element> {
		self.document.get_element_by_id(id)
	}

	fn find_by_id(&self, root: &Element, id: &str) -> Option<Element> {
		// Scoped to `root`: several forms on a page may reuse the same field ids.
		root.query_selector(&id_selector(id)).ok().flatten()
	}

	fn find_by_class(&self, root: &Element, class: &str) -> Vec<Element> {
		let Ok(nodes) = root.query_selector_all(&format!(".{}", class)) else {
			return Vec::new();
		};
		(0..nodes.length())
			.filter_map(|i| nodes.item(i))
			.filter_map(|node| node.dyn_into::<Element>().ok())
			.collect()
	}

	fn parent(&self, element: &Element) -> Option<Element> {
		element.parent_element()
	}

	fn attribute(&self, element: &Element, name: &str) -> Option<String> {
		element.get_attribute(name)
	}

	fn create_element(&self, tag: &str) -> Result<Element, SubmitError> {
		Ok(self.document.create_element(tag)?)
	}

	fn set_text(&self, element: &Element, text: &str) {
		element.set_text_content(Some(text));
	}

	fn add_class(&self, element: &Element, class: &str) -> Result<(), SubmitError> {
		Ok(element.class_list().add_1(class)?)
	}

	fn remove_class(&self, element: &Element, class: &str) -> Result<(), SubmitError> {
		Ok(element.class_list().remove_1(class)?)
	}

	fn append_child(&self, parent: &Element, child: &Element) -> Result<(), SubmitError> {
		parent.append_child(child)?;
		Ok(())
	}

	fn prepend_child(&self, parent: &Element, child: &Element) -> Result<(), SubmitError> {
		Ok(parent.prepend_with_node_1(child)?)
	}

	fn remove(&self, element: &Element) {
		element.remove();
	}

	fn replace_contents(&self, element: &Element, markup: &str) {
		element.set_inner_html(markup);
	}

	fn form_body(&self, form: &Element) -> Result<FormData, SubmitError> {
		let form = form
			.dyn_ref::<HtmlFormElement>()
			.ok_or_else(|| SubmitError::dom("element is not a <form>"))?;
		Ok(FormData::new_with_form(form)?)
	}

	/// Replaces the listener previously registered under the same form id,
	/// so rebinding after a markup swap does not accumulate closures.
	fn intercept_submit(&self, form: &Element, handler: SubmitHandler) -> Result<(), SubmitError> {
		let closure: SubmitListener = Closure::wrap(Box::new(move |event: Event| {
			event.prevent_default();
			handler();
		}) as Box<dyn FnMut(_)>);

		form.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref())?;

		let previous = self
			.listeners
			.borrow_mut()
			.insert(form.id(), (form.clone(), closure));
		if let Some((element, closure)) = previous {
			element.remove_event_listener_with_callback(
				"submit",
				closure.as_ref().unchecked_ref(),
			)?;
		}
		Ok(())
	}
}
