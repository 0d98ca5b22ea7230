use leptos::prelude::*;
use wasm_bindgen::JsValue;
use web_sys::MessageEvent;

use crate::components::force_graph::ForceGraphCanvas;
use crate::graph::sample_graph;
use crate::host::HostMessage;

/// JSON text of a posted message, whether it was sent as a string or an object.
fn message_json(data: &JsValue) -> Option<String> {
	data.as_string()
		.or_else(|| js_sys::JSON::stringify(data).ok().map(String::from))
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	// Drawn until the host posts a graph
	let graph_data = RwSignal::new(sample_graph());

	let listener = window_event_listener(leptos::ev::message, move |ev: MessageEvent| {
		let Some(json) = message_json(&ev.data()) else {
			log::warn!("Ignoring host message without data");
			return;
		};
		match HostMessage::from_json(&json) {
			Ok(msg) => {
				log::debug!("Host message received ({} bytes)", json.len());
				graph_data.set(msg.into_graph());
			}
			Err(err) => log::warn!("{err}"),
		}
	});
	on_cleanup(move || listener.remove());

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<ForceGraphCanvas data=graph_data fullscreen=true />
				<div class="graph-overlay">
					<h1>"Function Call Graph"</h1>
					<p class="subtitle">
						"Drag nodes to reposition. Scroll to zoom. Click a node to highlight its calls."
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
