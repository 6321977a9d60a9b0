//! Test doubles for the controller seams
//!
//! - [`MemoryDom`]: an in-memory element tree implementing [`FormDom`]
//! - [`MockTransport`]: scripted responses, immediate or deferred
//! - [`RecordingNavigator`]: records navigation targets
//! - [`CountingHooks`]: counts global handler reattachments and toasts
//!
//! Available in unit tests and behind the `testing` feature.
//!
//! # Example
//!
//! ```ignore
//! use reinhardt_ajax_forms::testing::{MemoryDom, MockTransport};
//!
//! let dom = MemoryDom::new();
//! let form = dom.add_form(dom.body(), "signup", "/accounts/signup/", "post");
//! dom.add_field(form, "email");
//!
//! let transport = MockTransport::new();
//! transport.respond(400, r#"{"errors": {"email": ["Required"]}}"#);
//! ```

use crate::dom::{FormDom, SubmitHandler};
use crate::error::SubmitError;
use crate::navigation::{Navigator, SubmitHooks};
use crate::payload::RawResponse;
use crate::request::{FormBody, SubmissionRequest};
use crate::transport::Transport;
use async_trait::async_trait;
use futures::channel::oneshot;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

/// Handle of a [`MemoryDom`] element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Default)]
struct Node {
	tag: String,
	attributes: BTreeMap<String, String>,
	classes: Vec<String>,
	text: String,
	markup: Option<String>,
	children: Vec<NodeId>,
	parent: Option<NodeId>,
	body: FormBody,
	listeners: Vec<SubmitHandler>,
}

struct Tree {
	nodes: Vec<Node>,
}

impl Tree {
	fn node(&self, id: NodeId) -> &Node {
		&self.nodes[id.0]
	}

	fn node_mut(&mut self, id: NodeId) -> &mut Node {
		&mut self.nodes[id.0]
	}

	fn alloc(&mut self, tag: &str) -> NodeId {
		self.nodes.push(Node {
			tag: tag.to_string(),
			..Node::default()
		});
		NodeId(self.nodes.len() - 1)
	}

	fn detach(&mut self, id: NodeId) {
		if let Some(parent) = self.node_mut(id).parent.take() {
			self.node_mut(parent).children.retain(|child| *child != id);
		}
	}

	fn append(&mut self, parent: NodeId, child: NodeId) {
		self.detach(child);
		self.node_mut(child).parent = Some(parent);
		self.node_mut(parent).children.push(child);
	}

	fn prepend(&mut self, parent: NodeId, child: NodeId) {
		self.detach(child);
		self.node_mut(child).parent = Some(parent);
		self.node_mut(parent).children.insert(0, child);
	}

	fn clear_children(&mut self, id: NodeId) {
		for child in std::mem::take(&mut self.node_mut(id).children) {
			self.node_mut(child).parent = None;
		}
	}

	/// Descendants of `root` in document order, `root` excluded.
	fn descendants(&self, root: NodeId) -> Vec<NodeId> {
		let mut out = Vec::new();
		let mut stack: Vec<NodeId> = self.node(root).children.iter().rev().copied().collect();
		while let Some(id) = stack.pop() {
			out.push(id);
			stack.extend(self.node(id).children.iter().rev().copied());
		}
		out
	}

	fn has_id(&self, node: NodeId, id: &str) -> bool {
		self.node(node).attributes.get("id").map(String::as_str) == Some(id)
	}
}

/// In-memory DOM.
///
/// Every element created through the builder methods or [`FormDom`] lives in
/// one shared tree rooted at [`body`](Self::body). Clones share the tree.
#[derive(Clone)]
pub struct MemoryDom {
	tree: Rc<RefCell<Tree>>,
}

impl Default for MemoryDom {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryDom {
	/// Creates a document holding an empty `<body>`.
	pub fn new() -> Self {
		let mut tree = Tree { nodes: Vec::new() };
		tree.alloc("body");
		Self {
			tree: Rc::new(RefCell::new(tree)),
		}
	}

	/// The document body.
	pub fn body(&self) -> NodeId {
		NodeId(0)
	}

	/// Appends a new `<tag>` to `parent`.
	pub fn append_element(&self, parent: NodeId, tag: &str) -> NodeId {
		let mut tree = self.tree.borrow_mut();
		let id = tree.alloc(tag);
		tree.append(parent, id);
		id
	}

	/// Sets an attribute.
	pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
		self.tree
			.borrow_mut()
			.node_mut(node)
			.attributes
			.insert(name.to_string(), value.to_string());
	}

	/// Appends `<div><form id=.. action=.. method=..>` to `parent` and
	/// returns the form. The div is the form's container.
	pub fn add_form(&self, parent: NodeId, id: &str, action: &str, method: &str) -> NodeId {
		let container = self.append_element(parent, "div");
		let form = self.append_element(container, "form");
		self.set_attribute(form, "id", id);
		self.set_attribute(form, "action", action);
		self.set_attribute(form, "method", method);
		form
	}

	/// Appends `div#id_<name>_container.input-field > input#id_<name>` to
	/// `form` and returns `(container, input)`.
	pub fn add_field(&self, form: NodeId, name: &str) -> (NodeId, NodeId) {
		let container = self.append_element(form, "div");
		self.set_attribute(container, "id", &format!("id_{}_container", name));
		self.tree
			.borrow_mut()
			.node_mut(container)
			.classes
			.push("input-field".to_string());
		let input = self.append_element(container, "input");
		self.set_attribute(input, "id", &format!("id_{}", name));
		self.set_attribute(input, "name", name);
		(container, input)
	}

	/// Sets what [`FormDom::form_body`] returns for `form`.
	pub fn set_form_body(&self, form: NodeId, body: FormBody) {
		self.tree.borrow_mut().node_mut(form).body = body;
	}

	/// Fires a submit event at `node`.
	///
	/// Returns whether the default action was prevented. Interceptors
	/// registered through [`FormDom::intercept_submit`] always prevent it, so
	/// this is whether `node` has one. The browser side is covered by the
	/// `wasm-bindgen-test` suite.
	pub fn dispatch_submit(&self, node: NodeId) -> bool {
		let listeners = self.tree.borrow().node(node).listeners.clone();
		for listener in &listeners {
			listener();
		}
		!listeners.is_empty()
	}

	/// Number of submit interceptors on `node`.
	pub fn listener_count(&self, node: NodeId) -> usize {
		self.tree.borrow().node(node).listeners.len()
	}

	/// Tag name.
	pub fn tag(&self, node: NodeId) -> String {
		self.tree.borrow().node(node).tag.clone()
	}

	/// Text content set through [`FormDom::set_text`].
	pub fn text(&self, node: NodeId) -> String {
		self.tree.borrow().node(node).text.clone()
	}

	/// Class list.
	pub fn classes(&self, node: NodeId) -> Vec<String> {
		self.tree.borrow().node(node).classes.clone()
	}

	/// Whether `node` carries `class`.
	pub fn has_class(&self, node: NodeId, class: &str) -> bool {
		self.tree
			.borrow()
			.node(node)
			.classes
			.iter()
			.any(|c| c == class)
	}

	/// Child elements in order.
	pub fn children(&self, node: NodeId) -> Vec<NodeId> {
		self.tree.borrow().node(node).children.clone()
	}

	/// Markup last assigned through [`FormDom::replace_contents`].
	pub fn markup(&self, node: NodeId) -> Option<String> {
		self.tree.borrow().node(node).markup.clone()
	}

	/// Whether `node` is reachable from the body.
	pub fn is_attached(&self, node: NodeId) -> bool {
		let tree = self.tree.borrow();
		let mut current = Some(node);
		while let Some(id) = current {
			if id == NodeId(0) {
				return true;
			}
			current = tree.node(id).parent;
		}
		false
	}

	/// Texts of the lines inside every `class` block below `root`.
	pub fn block_texts(&self, root: NodeId, class: &str) -> Vec<Vec<String>> {
		self.find_by_class(&root, class)
			.into_iter()
			.map(|block| {
				self.children(block)
					.into_iter()
					.map(|line| self.text(line))
					.collect()
			})
			.collect()
	}
}

/// Element ids found in `markup`, with their tag names, in order.
///
/// Only recognizes `id` attributes, quoted or not. Enough to stand in for
/// the parser when the test needs to find an element the server rendered.
fn scan_ids(markup: &str) -> Vec<(String, String)> {
	let mut found = Vec::new();
	for tag_start in markup.split('<').skip(1) {
		let Some(inside) = tag_start.split('>').next() else {
			continue;
		};
		let mut parts = inside.split_whitespace();
		let Some(tag) = parts.next().filter(|t| !t.starts_with('/')) else {
			continue;
		};
		let rest = &inside[tag.len()..];
		let Some(pos) = rest.find("id=") else {
			continue;
		};
		let preceded_by_space = rest[..pos].ends_with(char::is_whitespace);
		if !preceded_by_space {
			continue;
		}
		let value = &rest[pos + 3..];
		let id = match value.chars().next() {
			Some(quote @ ('"' | '\'')) => value[1..].split(quote).next().unwrap_or_default(),
			_ => value
				.split(|c: char| c.is_whitespace() || c == '/')
				.next()
				.unwrap_or_default(),
		};
		if !id.is_empty() {
			found.push((tag.to_ascii_lowercase(), id.to_string()));
		}
	}
	found
}

impl FormDom for MemoryDom {
	type Element = NodeId;
	type Body = FormBody;

	fn element_by_id(&self, id: &str) -> Option<NodeId> {
		self.find_by_id(&self.body(), id)
	}

	fn find_by_id(&self, root: &NodeId, id: &str) -> Option<NodeId> {
		let tree = self.tree.borrow();
		tree.descendants(*root)
			.into_iter()
			.find(|node| tree.has_id(*node, id))
	}

	fn find_by_class(&self, root: &NodeId, class: &str) -> Vec<NodeId> {
		let tree = self.tree.borrow();
		tree.descendants(*root)
			.into_iter()
			.filter(|node| tree.node(*node).classes.iter().any(|c| c == class))
			.collect()
	}

	fn parent(&self, element: &NodeId) -> Option<NodeId> {
		self.tree.borrow().node(*element).parent
	}

	fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
		self.tree
			.borrow()
			.node(*element)
			.attributes
			.get(name)
			.cloned()
	}

	fn create_element(&self, tag: &str) -> Result<NodeId, SubmitError> {
		Ok(self.tree.borrow_mut().alloc(tag))
	}

	fn set_text(&self, element: &NodeId, text: &str) {
		let mut tree = self.tree.borrow_mut();
		tree.clear_children(*element);
		tree.node_mut(*element).text = text.to_string();
	}

	fn add_class(&self, element: &NodeId, class: &str) -> Result<(), SubmitError> {
		let mut tree = self.tree.borrow_mut();
		let classes = &mut tree.node_mut(*element).classes;
		if !classes.iter().any(|c| c == class) {
			classes.push(class.to_string());
		}
		Ok(())
	}

	fn remove_class(&self, element: &NodeId, class: &str) -> Result<(), SubmitError> {
		self.tree
			.borrow_mut()
			.node_mut(*element)
			.classes
			.retain(|c| c != class);
		Ok(())
	}

	fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), SubmitError> {
		self.tree.borrow_mut().append(*parent, *child);
		Ok(())
	}

	fn prepend_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), SubmitError> {
		self.tree.borrow_mut().prepend(*parent, *child);
		Ok(())
	}

	fn remove(&self, element: &NodeId) {
		self.tree.borrow_mut().detach(*element);
	}

	fn replace_contents(&self, element: &NodeId, markup: &str) {
		let mut tree = self.tree.borrow_mut();
		tree.clear_children(*element);
		tree.node_mut(*element).text.clear();
		tree.node_mut(*element).markup = Some(markup.to_string());
		for (tag, id) in scan_ids(markup) {
			let node = tree.alloc(&tag);
			tree.node_mut(node).attributes.insert("id".to_string(), id);
			tree.append(*element, node);
		}
	}

	fn form_body(&self, form: &NodeId) -> Result<FormBody, SubmitError> {
		Ok(self.tree.borrow().node(*form).body.clone())
	}

	fn intercept_submit(&self, form: &NodeId, handler: SubmitHandler) -> Result<(), SubmitError> {
		self.tree.borrow_mut().node_mut(*form).listeners.push(handler);
		Ok(())
	}
}

enum Scripted {
	Ready(Result<RawResponse, SubmitError>),
	Deferred(oneshot::Receiver<RawResponse>),
}

#[derive(Default)]
struct MockState {
	script: VecDeque<Scripted>,
	requests: Vec<SubmissionRequest<FormBody>>,
}

/// Transport answering from a script, in order.
///
/// A request with nothing left in the script fails with
/// [`SubmitError::Transport`].
#[derive(Clone, Default)]
pub struct MockTransport {
	state: Rc<RefCell<MockState>>,
}

impl MockTransport {
	/// Creates a transport with an empty script.
	pub fn new() -> Self {
		Self::default()
	}

	/// Queues a response.
	pub fn respond(&self, status: u16, body: &str) -> &Self {
		self.push(Scripted::Ready(Ok(RawResponse::new(status, body))))
	}

	/// Queues a JSON response.
	pub fn respond_json(&self, status: u16, body: serde_json::Value) -> &Self {
		self.respond(status, &body.to_string())
	}

	/// Queues a transport failure.
	pub fn fail(&self, error: SubmitError) -> &Self {
		self.push(Scripted::Ready(Err(error)))
	}

	/// Queues a response that is only delivered once the returned sender
	/// is used. Dropping the sender fails the request.
	pub fn defer(&self) -> oneshot::Sender<RawResponse> {
		let (tx, rx) = oneshot::channel();
		self.push(Scripted::Deferred(rx));
		tx
	}

	/// Requests sent so far.
	pub fn requests(&self) -> Vec<SubmissionRequest<FormBody>> {
		self.state.borrow().requests.clone()
	}

	/// Number of requests sent so far.
	pub fn request_count(&self) -> usize {
		self.state.borrow().requests.len()
	}

	fn push(&self, scripted: Scripted) -> &Self {
		self.state.borrow_mut().script.push_back(scripted);
		self
	}
}

#[async_trait(?Send)]
impl Transport<FormBody> for MockTransport {
	async fn send(&self, request: SubmissionRequest<FormBody>) -> Result<RawResponse, SubmitError> {
		let next = {
			let mut state = self.state.borrow_mut();
			state.requests.push(request);
			state.script.pop_front()
		};
		match next {
			Some(Scripted::Ready(result)) => result,
			Some(Scripted::Deferred(rx)) => rx
				.await
				.map_err(|_| SubmitError::transport("deferred response dropped")),
			None => Err(SubmitError::transport("no scripted response left")),
		}
	}
}

/// Navigator that records targets instead of leaving the page.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
	visits: Rc<RefCell<Vec<String>>>,
}

impl RecordingNavigator {
	/// Creates a navigator with no visits.
	pub fn new() -> Self {
		Self::default()
	}

	/// All targets, oldest first.
	pub fn visits(&self) -> Vec<String> {
		self.visits.borrow().clone()
	}
}

impl Navigator for RecordingNavigator {
	fn navigate(&self, url: &str) -> Result<(), SubmitError> {
		self.visits.borrow_mut().push(url.to_string());
		Ok(())
	}
}

/// Hooks that count their invocations.
#[derive(Debug, Clone, Default)]
pub struct CountingHooks {
	reattached: Rc<Cell<usize>>,
	toasts: Rc<RefCell<Vec<String>>>,
}

impl CountingHooks {
	/// Creates hooks with zeroed counters.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of `reattach_global_handlers` calls.
	pub fn reattached(&self) -> usize {
		self.reattached.get()
	}

	/// Toast messages received, oldest first.
	pub fn toasts(&self) -> Vec<String> {
		self.toasts.borrow().clone()
	}
}

impl SubmitHooks for CountingHooks {
	fn reattach_global_handlers(&self) {
		self.reattached.set(self.reattached.get() + 1);
	}

	fn toast(&self, message: &str) {
		self.toasts.borrow_mut().push(message.to_string());
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(r#"<form id="f" method="post"></form>"#, vec![("form", "f")])]
	#[case("<form id=f>...</form>", vec![("form", "f")])]
	#[case("<div class=x><FORM id='g'/></div>", vec![("form", "g")])]
	#[case(r#"<p data-id="x">no id</p>"#, vec![])]
	#[case("<p>plain</p>", vec![])]
	fn test_scan_ids(#[case] markup: &str, #[case] expected: Vec<(&str, &str)>) {
		let found = scan_ids(markup);
		let found: Vec<(&str, &str)> = found
			.iter()
			.map(|(tag, id)| (tag.as_str(), id.as_str()))
			.collect();
		assert_eq!(found, expected);
	}

	#[rstest]
	fn test_memory_dom_lookup_and_detach() {
		let dom = MemoryDom::new();
		let form = dom.add_form(dom.body(), "f", "/save/", "post");
		let (container, input) = dom.add_field(form, "email");

		assert_eq!(dom.element_by_id("f"), Some(form));
		assert_eq!(dom.find_by_id(&form, "id_email"), Some(input));
		assert_eq!(dom.find_by_class(&form, "input-field"), vec![container]);

		dom.remove(&container);
		assert_eq!(dom.element_by_id("id_email"), None);
		assert!(!dom.is_attached(input));
	}

	#[rstest]
	fn test_replace_contents_exposes_rendered_ids() {
		let dom = MemoryDom::new();
		let form = dom.add_form(dom.body(), "f", "/save/", "post");
		let container = dom.parent(&form).unwrap();

		dom.replace_contents(&container, "<form id=f><input id=id_name></form>");

		assert!(!dom.is_attached(form));
		let new_form = dom.element_by_id("f").unwrap();
		assert_ne!(new_form, form);
		assert_eq!(dom.tag(new_form), "form");
		assert_eq!(
			dom.markup(container).as_deref(),
			Some("<form id=f><input id=id_name></form>")
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_mock_transport_script_order() {
		let transport = MockTransport::new();
		transport.respond(200, "{}").respond(400, "{}");

		let request = || SubmissionRequest::from_attributes("f", None, None, FormBody::new());
		assert_eq!(transport.send(request()).await.unwrap().status, 200);
		assert_eq!(transport.send(request()).await.unwrap().status, 400);
		assert!(matches!(
			transport.send(request()).await,
			Err(SubmitError::Transport(_))
		));
		assert_eq!(transport.request_count(), 3);
	}
}
