use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent, Window,
};

use super::export;
use super::runtime::CanvasRuntime;
use super::state::{ForceGraphState, SearchOutcome, Tooltip};
use super::svg;
use crate::config::GraphConfig;
use crate::graph::CallGraph;

const NO_MATCH: &str = "No matching nodes found";

#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<CallGraph>,
	#[prop(optional)] config: GraphConfig,
	/// Session handle; pass one in to tear the view down from outside.
	#[prop(optional)]
	runtime: CanvasRuntime,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let counts = RwSignal::new((0usize, 0usize));
	let tooltip = RwSignal::new(None::<Tooltip>);
	let status = RwSignal::new(None::<String>);
	let labels_visible = RwSignal::new(true);
	let query = RwSignal::new(String::new());
	let export_name = config.export_file_name.clone();

	let rt = runtime.clone();
	Effect::new(move |_| {
		let graph = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window)
		} else {
			let parent = canvas.parent_element();
			(
				width.unwrap_or_else(|| parent.as_ref().map(|p| p.client_width() as f64).unwrap_or(800.0)),
				height.unwrap_or_else(|| parent.as_ref().map(|p| p.client_height() as f64).unwrap_or(600.0)),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx = match context_2d(&canvas) {
			Ok(ctx) => ctx,
			Err(err) => {
				log::error!("{err}");
				status.set(Some(err.to_string()));
				return;
			}
		};

		if let Err(err) = config.validate() {
			log::error!("{err}");
			status.set(Some(err.to_string()));
			return;
		}
		rt.begin_loading();
		let state = ForceGraphState::new(&graph, config.clone(), w, h);
		counts.set(state.counts());
		labels_visible.set(state.labels_visible);
		tooltip.set(None);
		status.set(None);
		rt.load(state);

		if fullscreen {
			let (rt_resize, canvas_resize) = (rt.clone(), canvas.clone());
			rt.on_resize(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				rt_resize.with_state(|s| s.resize(nw, nh));
			}));
		}
		rt.start_frame_loop(ctx);
	});

	on_cleanup(runtime.teardown_hook());

	let rt = runtime.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		rt.with_state(|s| match s.node_at_position(x, y) {
			Some(idx) => s.begin_drag(idx),
			None => s.begin_pan(x, y),
		});
	};

	let rt = runtime.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		let tip = rt.with_state(|s| {
			if s.is_dragging() {
				s.drag_to(x, y);
			} else if s.pan.active {
				s.pan_to(x, y);
			} else {
				let hovered = s.node_at_position(x, y);
				s.hover(hovered, x, y);
			}
			s.tooltip.clone()
		});
		if let Some(tip) = tip {
			tooltip.set(tip);
		}
	};

	let rt = runtime.clone();
	let on_mouseup = move |_: MouseEvent| {
		rt.with_state(|s| {
			s.end_drag();
			s.end_pan();
		});
	};

	let rt = runtime.clone();
	let on_mouseleave = move |_: MouseEvent| {
		rt.with_state(|s| {
			s.end_drag();
			s.end_pan();
			s.hover(None, 0.0, 0.0);
		});
		tooltip.set(None);
	};

	let rt = runtime.clone();
	let on_click = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		let tip = rt.with_state(|s| {
			if s.take_click_suppression() {
				return None;
			}
			let idx = s.node_at_position(x, y)?;
			s.click_node(idx, x, y);
			s.tooltip.clone()
		});
		if let Some(tip) = tip.flatten() {
			tooltip.set(Some(tip));
		}
	};

	let rt = runtime.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		rt.with_state(|s| s.zoom_at(x, y, factor));
	};

	let rt = runtime.clone();
	let run_search = move || {
		let q = query.get_untracked();
		match rt.with_state(|s| s.search(&q)) {
			Some(SearchOutcome::Focused { label, .. }) => {
				log::debug!("Focused {label}");
				status.set(None);
			}
			Some(SearchOutcome::NoMatch) => status.set(Some(NO_MATCH.into())),
			None => {}
		}
	};
	let search_click = {
		let run = run_search.clone();
		move |_: MouseEvent| run()
	};
	let search_enter = move |ev: KeyboardEvent| {
		if ev.key() == "Enter" {
			run_search();
		}
	};

	let rt = runtime.clone();
	let on_zoom_in = move |_: MouseEvent| {
		rt.with_state(|s| s.zoom_in());
	};
	let rt = runtime.clone();
	let on_zoom_out = move |_: MouseEvent| {
		rt.with_state(|s| s.zoom_out());
	};
	let rt = runtime.clone();
	let on_reset = move |_: MouseEvent| {
		rt.with_state(|s| s.reset_view());
	};
	let rt = runtime.clone();
	let on_toggle_labels = move |_: MouseEvent| {
		if let Some(visible) = rt.with_state(|s| s.toggle_labels()) {
			labels_visible.set(visible);
		}
	};
	let rt = runtime.clone();
	let on_export = move |_: MouseEvent| {
		let Some(document) = rt.with_state(|s| svg::export_document(s)) else {
			return;
		};
		if let Err(err) = export::download_svg(&document, &export_name, &rt) {
			log::warn!("{err}");
			status.set(Some(err.to_string()));
		}
	};

	view! {
		<div class="call-graph" style="position: relative; width: 100%; height: 100%;">
			<canvas
				node_ref=canvas_ref
				class="force-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:click=on_click
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div class="graph-controls">
				<input
					type="text"
					placeholder="Search functions..."
					prop:value=move || query.get()
					on:input=move |ev| query.set(event_target_value(&ev))
					on:keydown=search_enter
				/>
				<button on:click=search_click>"Search"</button>
				<button on:click=on_zoom_in title="Zoom in">"+"</button>
				<button on:click=on_zoom_out title="Zoom out">"-"</button>
				<button on:click=on_reset>"Reset"</button>
				<button on:click=on_toggle_labels>
					{move || if labels_visible.get() { "Hide labels" } else { "Show labels" }}
				</button>
				<button on:click=on_export>"Export SVG"</button>
			</div>
			<div class="graph-stats">
				"Nodes: " <span class="node-count">{move || counts.get().0}</span>
				" | Edges: " <span class="edge-count">{move || counts.get().1}</span>
			</div>
			{move || status.get().map(|msg| view! { <div class="graph-status">{msg}</div> })}
			{move || {
				tooltip
					.get()
					.map(|tip| {
						view! {
							<div
								class="graph-tooltip"
								style=format!(
									"position: absolute; pointer-events: none; left: {}px; top: {}px;",
									tip.x,
									tip.y,
								)
							>
								<strong>{tip.label}</strong>
								<br />
								{format!(
									"Calls: {} | Called by: {}",
									tip.degrees.outgoing,
									tip.degrees.incoming,
								)}
							</div>
						}
					})
			}}
		</div>
	}
}

fn window_size(window: &Window) -> (f64, f64) {
	let dim = |v: Result<JsValue, JsValue>, fallback: f64| {
		v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	(dim(window.inner_width(), 800.0), dim(window.inner_height(), 600.0))
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, crate::RenderError> {
	canvas
		.get_context("2d")
		.ok()
		.flatten()
		.and_then(|ctx| ctx.dyn_into().ok())
		.ok_or_else(|| crate::RenderError::Canvas("2d context not available".into()))
}

fn local_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}
