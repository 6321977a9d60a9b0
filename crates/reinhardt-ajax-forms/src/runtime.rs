//! Local task spawning
//!
//! Submissions run on the UI thread. In the browser they are handed to the
//! microtask queue; natively they must be spawned inside a
//! `tokio::task::LocalSet`.

use std::future::Future;

/// Spawns a `!Send` future on the current thread.
#[cfg(target_arch = "wasm32")]
pub fn spawn_local<F>(future: F)
where
	F: Future<Output = ()> + 'static,
{
	wasm_bindgen_futures::spawn_local(future);
}

/// Spawns a `!Send` future on the current thread.
///
/// # Panics
///
/// Panics when called outside a `tokio::task::LocalSet`.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_local<F>(future: F)
where
	F: Future<Output = ()> + 'static,
{
	drop(tokio::task::spawn_local(future));
}
