use std::cell::{Cell, RefCell};
use std::rc::Rc;

use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Url};

use super::render;
use super::state::{ForceGraphState, SessionPhase};

const FRAME_DT: f64 = 0.016;

struct RuntimeInner {
	state: RefCell<Option<ForceGraphState>>,
	loading: Cell<bool>,
	// phase as of the last time the state was released
	last_phase: Cell<SessionPhase>,
	torn_down: Cell<bool>,
	frame_id: Cell<Option<i32>>,
	animate: RefCell<Option<Closure<dyn FnMut()>>>,
	resize: RefCell<Option<Closure<dyn FnMut()>>>,
	pending_urls: RefCell<Vec<String>>,
}

impl Default for RuntimeInner {
	fn default() -> Self {
		Self {
			state: RefCell::default(),
			loading: Cell::new(false),
			last_phase: Cell::new(SessionPhase::Idle),
			torn_down: Cell::new(false),
			frame_id: Cell::default(),
			animate: RefCell::default(),
			resize: RefCell::default(),
			pending_urls: RefCell::default(),
		}
	}
}

/// Shared handle on one render session: its state, frame loop, window
/// listeners and export URLs. Clones refer to the same session.
#[derive(Clone, Default)]
pub struct CanvasRuntime {
	inner: Rc<RuntimeInner>,
}

impl CanvasRuntime {
	pub fn phase(&self) -> SessionPhase {
		if self.inner.torn_down.get() {
			return SessionPhase::TornDown;
		}
		if self.inner.loading.get() {
			return SessionPhase::Loading;
		}
		match self.inner.state.try_borrow() {
			Ok(state) => state.as_ref().map_or(SessionPhase::Idle, |s| s.phase()),
			// borrowed by a tick or handler right now
			Err(_) => self.inner.last_phase.get(),
		}
	}

	pub fn is_torn_down(&self) -> bool {
		self.inner.torn_down.get()
	}

	/// Mark the session as building its state; cleared by [`Self::load`].
	pub fn begin_loading(&self) {
		if !self.is_torn_down() {
			self.inner.loading.set(true);
			log::info!("Render session {:?}", SessionPhase::Loading);
		}
	}

	/// Install a new session state, replacing any previous one.
	pub fn load(&self, state: ForceGraphState) {
		self.inner.loading.set(false);
		if self.is_torn_down() {
			return;
		}
		self.inner.last_phase.set(state.phase());
		*self.inner.state.borrow_mut() = Some(state);
	}

	/// Run `f` on the session state, if there is one and it is not borrowed.
	pub fn with_state<R>(&self, f: impl FnOnce(&mut ForceGraphState) -> R) -> Option<R> {
		let mut guard = self.inner.state.try_borrow_mut().ok()?;
		let state = guard.as_mut()?;
		let out = f(state);
		self.inner.last_phase.set(state.phase());
		Some(out)
	}

	/// A `Send + Sync` callback that tears this session down, for reactive
	/// cleanup hooks. The wrapped handle must be used on this thread only,
	/// which holds for wasm.
	pub fn teardown_hook(&self) -> impl FnOnce() + Send + Sync + 'static {
		let runtime = SendWrapper::new(self.clone());
		move || runtime.teardown()
	}

	/// Start ticking and drawing once per animation frame. Later calls are
	/// no-ops while the loop runs.
	pub fn start_frame_loop(&self, ctx: CanvasRenderingContext2d) {
		if self.is_torn_down() || self.inner.animate.borrow().is_some() {
			return;
		}
		let runtime = self.clone();
		*self.inner.animate.borrow_mut() = Some(Closure::new(move || {
			if runtime.is_torn_down() {
				return;
			}
			runtime.with_state(|s| {
				s.tick(FRAME_DT);
				render::render(s, &ctx);
			});
			runtime.request_frame();
		}));
		self.request_frame();
	}

	fn request_frame(&self) {
		let Some(window) = web_sys::window() else {
			return;
		};
		if let Some(cb) = self.inner.animate.borrow().as_ref() {
			match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
				Ok(id) => self.inner.frame_id.set(Some(id)),
				Err(err) => log::warn!("requestAnimationFrame failed: {:?}", err),
			}
		}
	}

	/// Listen for window resizes until teardown.
	pub fn on_resize(&self, cb: Closure<dyn FnMut()>) {
		let Some(window) = web_sys::window() else {
			return;
		};
		if let Err(err) = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())
		{
			log::warn!("Could not listen for resize: {:?}", err);
			return;
		}
		if let Some(old) = self.inner.resize.borrow_mut().replace(cb) {
			let _ = window.remove_event_listener_with_callback("resize", old.as_ref().unchecked_ref());
		}
	}

	pub fn track_url(&self, url: &str) {
		self.inner.pending_urls.borrow_mut().push(url.to_string());
	}

	/// Revoke an object URL and forget it.
	pub fn release_url(&self, url: &str) {
		self.inner.pending_urls.borrow_mut().retain(|u| u != url);
		if let Err(err) = Url::revoke_object_url(url) {
			log::warn!("Could not revoke {url}: {:?}", err);
		}
	}

	/// Stop the frame loop, detach listeners, revoke export URLs and drop
	/// the session state. Idempotent.
	pub fn teardown(&self) {
		if self.inner.torn_down.replace(true) {
			return;
		}
		self.inner.loading.set(false);
		let frame_id = self.inner.frame_id.take();
		let resize = self.inner.resize.borrow_mut().take();
		if frame_id.is_some() || resize.is_some() {
			if let Some(window) = web_sys::window() {
				if let Some(id) = frame_id {
					let _ = window.cancel_animation_frame(id);
				}
				if let Some(cb) = resize {
					let _ =
						window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
			}
		}
		// breaks the runtime <-> frame closure cycle
		self.inner.animate.borrow_mut().take();
		for url in self.inner.pending_urls.take() {
			let _ = Url::revoke_object_url(&url);
		}
		if let Ok(mut state) = self.inner.state.try_borrow_mut() {
			state.take();
		}
		self.inner.last_phase.set(SessionPhase::TornDown);
		log::info!("Render session {:?}", SessionPhase::TornDown);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::GraphConfig;
	use crate::graph::sample_graph;

	#[test]
	fn phase_follows_the_session() {
		let runtime = CanvasRuntime::default();
		assert_eq!(runtime.phase(), SessionPhase::Idle);
		runtime.load(ForceGraphState::new(
			&sample_graph(),
			GraphConfig::default(),
			640.0,
			480.0,
		));
		assert_eq!(runtime.phase(), SessionPhase::Settling);
		assert_eq!(runtime.with_state(|s| s.counts()), Some((6, 5)));
	}

	#[test]
	fn loading_is_tracked_explicitly() {
		let runtime = CanvasRuntime::default();
		runtime.begin_loading();
		assert_eq!(runtime.phase(), SessionPhase::Loading);
		runtime.load(ForceGraphState::new(
			&sample_graph(),
			GraphConfig::default(),
			640.0,
			480.0,
		));
		assert_eq!(runtime.phase(), SessionPhase::Settling);

		// a busy state is not mistaken for a loading one
		let probe = runtime.clone();
		let inside = runtime.with_state(|_| probe.phase());
		assert_eq!(inside, Some(SessionPhase::Settling));
	}

	#[test]
	fn teardown_hook_ends_the_session() {
		let runtime = CanvasRuntime::default();
		runtime.load(ForceGraphState::new(
			&sample_graph(),
			GraphConfig::default(),
			640.0,
			480.0,
		));
		let hook = runtime.teardown_hook();
		hook();

		assert_eq!(runtime.phase(), SessionPhase::TornDown);
		assert!(runtime.with_state(|s| s.counts()).is_none());
		assert!(runtime.inner.animate.borrow().is_none());

		runtime.load(ForceGraphState::new(
			&sample_graph(),
			GraphConfig::default(),
			640.0,
			480.0,
		));
		assert_eq!(runtime.phase(), SessionPhase::TornDown);
		runtime.teardown();
		assert_eq!(Rc::strong_count(&runtime.inner), 1);
	}

	#[test]
	fn clones_share_one_session() {
		let runtime = CanvasRuntime::default();
		let other = runtime.clone();
		runtime.load(ForceGraphState::new(
			&sample_graph(),
			GraphConfig::default(),
			640.0,
			480.0,
		));
		assert_eq!(other.with_state(|s| s.toggle_labels()), Some(false));
		assert_eq!(runtime.with_state(|s| s.labels_visible), Some(false));
	}
}
