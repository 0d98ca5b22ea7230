//! Interactive call-graph viewer: parses `=== FUNCTION CALL GRAPH ===`
//! listings and draws them as a force-directed graph on a canvas.

use std::any::Any;

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};
use wasm_bindgen::JsCast;

// Modules
pub mod components;
pub mod config;
mod error;
pub mod graph;
pub mod host;
mod pages;

pub use components::force_graph::{CanvasRuntime, ForceGraphCanvas, SessionPhase};
pub use config::GraphConfig;
pub use error::{ConfigError, MessageError, RenderError};
pub use graph::{CallGraph, parse};

// Top-Level pages
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// A live graph view mounted by [`render`].
///
/// Dropping the handle tears the view down as well.
pub struct RenderHandle {
	runtime: CanvasRuntime,
	// unmounts the view when dropped
	_view: Box<dyn Any>,
}

impl RenderHandle {
	pub fn phase(&self) -> SessionPhase {
		self.runtime.phase()
	}

	/// Stop the simulation, release listeners and export URLs, and remove
	/// the view from its mount.
	pub fn teardown(self) {
		drop(self);
	}
}

impl Drop for RenderHandle {
	fn drop(&mut self) {
		self.runtime.teardown();
	}
}

/// Mount an interactive view of `graph` inside the element `mount_id`.
///
/// `None` draws the built-in sample graph. An invalid `config`, or a mount
/// that is missing or no longer attached to the document, is reported, not
/// panicked on.
pub fn render(
	mount_id: &str,
	graph: Option<CallGraph>,
	config: GraphConfig,
) -> Result<RenderHandle, RenderError> {
	config
		.validate()
		.map_err(RenderError::from)
		.inspect_err(|err| log::error!("{err}"))?;
	let mount = find_mount(mount_id).inspect_err(|err| log::error!("{err}"))?;
	let graph = graph.unwrap_or_else(|| {
		info!("No graph supplied, rendering sample graph");
		graph::sample_graph()
	});

	let runtime = CanvasRuntime::default();
	let view_runtime = runtime.clone();
	let data = Signal::derive(move || graph.clone());
	let view = leptos::mount::mount_to(mount, move || {
		view! { <ForceGraphCanvas data=data config=config runtime=view_runtime /> }.into_any()
	});
	info!("Graph view mounted in #{mount_id}");

	Ok(RenderHandle {
		runtime,
		_view: Box::new(view),
	})
}

fn find_mount(mount_id: &str) -> Result<web_sys::HtmlElement, RenderError> {
	let missing = || RenderError::MountMissing {
		mount_id: mount_id.to_string(),
	};
	let element = web_sys::window()
		.and_then(|w| w.document())
		.and_then(|d| d.get_element_by_id(mount_id))
		.ok_or_else(missing)?;
	if !element.is_connected() {
		return Err(missing());
	}
	element.dyn_into().map_err(|_| missing())
}

/// An app router which renders the homepage and handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		// sets the document title
		<Title text="Call Graph" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
