//! Reinhardt AJAX Forms - asynchronous form submission for WASM front-ends
//!
//! Takes over the submit event of server-rendered Django-style forms, posts
//! them with `fetch` as multipart data (file inputs included), and applies
//! the view's JSON answer to the page.
//!
//! ## Features
//!
//! - **Redirects**: `{"location": ..}` navigates, whatever the status
//! - **Partial updates**: `{"render": ..}` replaces the form's container and
//!   re-intercepts the new form
//! - **Inline errors**: `{"error": .., "errors": {..}}` renders a banner,
//!   non-field errors and per-field messages next to each input
//! - **One request per form**: submits during a pending request are dropped
//! - **Safe rendering**: server messages are assigned as text, never markup
//!
//! ## Architecture
//!
//! - [`controller`]: [`FormSubmitController`], the submit/resolve cycle
//! - [`dom`]: [`FormDom`] seam and its `web-sys` implementation
//! - [`transport`]: [`Transport`] seam, `fetch` and `reqwest` implementations
//! - [`navigation`]: [`Navigator`] and [`SubmitHooks`] seams
//! - [`payload`]: response decoding into [`ResponsePayload`]
//! - [`request`]: [`SubmissionRequest`] and native [`FormBody`]
//! - [`settings`]: DOM naming and header options
//! - [`csrf`]: CSRF token lookup
//! - `testing`: in-memory doubles (unit tests, `testing` feature)
//!
//! ## Example
//!
//! ```ignore
//! use reinhardt_ajax_forms::{browser_controller, FnHooks, SubmitSettings};
//!
//! let controller = browser_controller(
//!     SubmitSettings::default(),
//!     FnHooks::new(|| menu::bind_dropdowns()),
//! )?;
//! controller.initialize(["profile-form"]);
//! ```

pub mod controller;
pub mod csrf;
pub mod dom;
pub mod error;
pub mod logging;
pub mod navigation;
pub mod payload;
pub mod request;
pub mod runtime;
pub mod settings;
pub mod transport;

#[cfg(target_arch = "wasm32")]
pub mod browser;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use controller::{FormSubmitController, SubmitOutcome};
pub use dom::{FormDom, SubmitHandler};
pub use error::SubmitError;
pub use navigation::{FnHooks, Navigator, NoopHooks, SubmitHooks};
pub use payload::{ErrorMap, RawResponse, ResponsePayload};
pub use request::{FieldValue, FormBody, FormEntry, SubmissionRequest};
pub use settings::{NON_FIELD_ERRORS_KEY, SubmitSettings};
pub use transport::Transport;

#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserFormController, browser_controller, init_forms};
#[cfg(target_arch = "wasm32")]
pub use dom::WebDom;
#[cfg(target_arch = "wasm32")]
pub use navigation::BrowserNavigator;
#[cfg(target_arch = "wasm32")]
pub use transport::FetchTransport;
#[cfg(not(target_arch = "wasm32"))]
pub use transport::ReqwestTransport;

#[doc(hidden)]
pub mod __private {
	#[cfg(not(target_arch = "wasm32"))]
	pub use tracing;
	#[cfg(target_arch = "wasm32")]
	pub use web_sys;
}
