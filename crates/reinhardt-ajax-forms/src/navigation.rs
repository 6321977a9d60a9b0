//! Page navigation and post-swap hooks

use crate::error::SubmitError;

/// Leaves the current page.
pub trait Navigator {
	/// Navigates the browser to `url`.
	fn navigate(&self, url: &str) -> Result<(), SubmitError>;
}

/// Navigates by assigning `window.location.href`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserNavigator;

#[cfg(target_arch = "wasm32")]
impl Navigator for BrowserNavigator {
	fn navigate(&self, url: &str) -> Result<(), SubmitError> {
		let window = web_sys::window().ok_or_else(|| SubmitError::Navigation {
			url: url.to_string(),
			reason: "No window object".to_string(),
		})?;
		window
			.location()
			.set_href(url)
			.map_err(|e| SubmitError::Navigation {
				url: url.to_string(),
				reason: format!("{:?}", e),
			})
	}
}

/// Page-level callbacks run by the controller.
///
/// Both methods default to no-ops.
pub trait SubmitHooks {
	/// Restores page-wide listeners (dropdowns, tab links, ...) after server
	/// markup has replaced part of the page.
	///
	/// Runs after every markup swap, so implementations must tolerate being
	/// called any number of times: unbind before rebinding, or bind through
	/// delegation on a stable ancestor.
	fn reattach_global_handlers(&self) {}

	/// Shows a short message carried by a redirect response (`toast_msg`).
	/// Runs right before navigation.
	fn toast(&self, _message: &str) {}
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl SubmitHooks for NoopHooks {}

/// Adapts a closure into [`SubmitHooks::reattach_global_handlers`].
///
/// ```ignore
/// let hooks = FnHooks::new(|| menu::bind_dropdowns());
/// ```
#[derive(Clone)]
pub struct FnHooks<F> {
	reattach: F,
}

impl<F: Fn()> FnHooks<F> {
	/// Wraps `reattach`.
	pub fn new(reattach: F) -> Self {
		Self { reattach }
	}
}

impl<F: Fn()> SubmitHooks for FnHooks<F> {
	fn reattach_global_handlers(&self) {
		(self.reattach)();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::cell::Cell;

	#[rstest]
	fn test_fn_hooks_runs_closure_each_time() {
		let calls = Cell::new(0);
		let hooks = FnHooks::new(|| calls.set(calls.get() + 1));

		hooks.reattach_global_handlers();
		hooks.reattach_global_handlers();
		hooks.toast("ignored");

		assert_eq!(calls.get(), 2);
	}
}
