//! DOM abstraction layer
//!
//! [`FormDom`] is the small slice of the DOM the controller needs: id and
//! class lookups, element construction with text content, class toggling,
//! markup replacement, form serialization and submit interception.
//!
//! - [`WebDom`] (WASM): backed by `web-sys`
//! - [`MemoryDom`](crate::testing::MemoryDom) (tests): an in-memory tree
//!
//! None of the methods take markup except [`FormDom::replace_contents`],
//! which receives server-rendered HTML. Messages from the server are only
//! ever assigned with [`FormDom::set_text`].

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(target_arch = "wasm32")]
pub use web::WebDom;

use crate::error::SubmitError;
use std::rc::Rc;

/// Callback invoked after a submit event has had its default action
/// cancelled.
pub type SubmitHandler = Rc<dyn Fn()>;

/// DOM operations used by the form controller.
pub trait FormDom {
	/// Element handle. Equal handles refer to the same element.
	type Element: Clone + PartialEq;

	/// Encoded form fields handed to the transport.
	type Body;

	/// Looks up an element by id anywhere in the document.
	fn element_by_id(&self, id: &str) -> Option<Self::Element>;

	/// Looks up an element by id among the descendants of `root`.
	fn find_by_id(&self, root: &Self::Element, id: &str) -> Option<Self::Element>;

	/// Returns all descendants of `root` carrying `class`, in document order.
	fn find_by_class(&self, root: &Self::Element, class: &str) -> Vec<Self::Element>;

	/// Parent element, if any.
	fn parent(&self, element: &Self::Element) -> Option<Self::Element>;

	/// Attribute value, if set.
	fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

	/// Creates a detached element.
	fn create_element(&self, tag: &str) -> Result<Self::Element, SubmitError>;

	/// Replaces the element's children with a single text node.
	fn set_text(&self, element: &Self::Element, text: &str);

	/// Adds a class to the element's class list.
	fn add_class(&self, element: &Self::Element, class: &str) -> Result<(), SubmitError>;

	/// Removes a class from the element's class list.
	fn remove_class(&self, element: &Self::Element, class: &str) -> Result<(), SubmitError>;

	/// Appends `child` as the last child of `parent`.
	fn append_child(&self, parent: &Self::Element, child: &Self::Element)
	-> Result<(), SubmitError>;

	/// Inserts `child` as the first child of `parent`.
	fn prepend_child(
		&self,
		parent: &Self::Element,
		child: &Self::Element,
	) -> Result<(), SubmitError>;

	/// Detaches the element from the document.
	fn remove(&self, element: &Self::Element);

	/// Replaces the element's contents with parsed `markup`.
	///
	/// `markup` is HTML rendered by the form's view on the server.
	fn replace_contents(&self, element: &Self::Element, markup: &str);

	/// Serializes the form's current fields, files included.
	fn form_body(&self, form: &Self::Element) -> Result<Self::Body, SubmitError>;

	/// Registers a submit listener that cancels the default action, then
	/// calls `handler`.
	fn intercept_submit(
		&self,
		form: &Self::Element,
		handler: SubmitHandler,
	) -> Result<(), SubmitError>;
}
