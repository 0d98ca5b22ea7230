use std::collections::HashSet;

use super::simulation::{SimNode, Simulation, SimulationPhase};
use super::types::{Degrees, NodeTier, degrees, truncate_label};
use crate::config::GraphConfig;
use crate::graph::{CallGraph, LimitReport, limit_graph};

pub const NODE_RADIUS: f64 = 5.0;
pub const HIT_RADIUS: f64 = 12.0;

const TOOLTIP_OFFSET: (f64, f64) = (10.0, -28.0);

/// Lifecycle of one render session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
	Idle,
	Loading,
	Settling,
	Resting,
	TornDown,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl ViewTransform {
	fn lerp(&self, to: &Self, t: f64) -> Self {
		Self {
			x: self.x + (to.x - self.x) * t,
			y: self.y + (to.y - self.y) * t,
			k: self.k + (to.k - self.k) * t,
		}
	}
}

#[derive(Clone, Debug)]
struct ViewTransition {
	from: ViewTransform,
	to: ViewTransform,
	elapsed: f64,
	duration: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<usize>,
	moved: bool,
	suppress_click: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Click-to-highlight selection.
#[derive(Clone, Debug, Default)]
pub struct Selection {
	pub node: usize,
	pub neighbors: HashSet<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
	pub label: String,
	pub degrees: Degrees,
	/// Screen position, already offset from the cursor.
	pub x: f64,
	pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeRole {
	Selected,
	Neighbor,
	Plain,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeRole {
	/// Ends at the selected node.
	Incoming,
	/// Leaves the selected node.
	Outgoing,
	Plain,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
	Focused { index: usize, label: String },
	NoMatch,
}

/// Everything one graph view owns: the size-limited graph, its simulation
/// and the camera and interaction state layered on top.
pub struct ForceGraphState {
	pub config: GraphConfig,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub selection: Option<Selection>,
	pub tooltip: Option<Tooltip>,
	pub labels_visible: bool,
	pub highlight_t: f64,
	pub width: f64,
	pub height: f64,
	graph: CallGraph,
	sim: Simulation,
	edges: Vec<(usize, usize)>,
	degrees: Vec<Degrees>,
	tiers: Vec<NodeTier>,
	labels: Vec<String>,
	hovered: Option<usize>,
	transition: Option<ViewTransition>,
	limit_report: LimitReport,
}

impl ForceGraphState {
	pub fn new(graph: &CallGraph, config: GraphConfig, width: f64, height: f64) -> Self {
		log::info!(
			"Render session {:?}: {} nodes, {} edges",
			SessionPhase::Loading,
			graph.node_count(),
			graph.edge_count()
		);
		let (graph, limit_report) = limit_graph(graph, &config.limits);
		let edges: Vec<(usize, usize)> = graph.edge_indices().collect();
		let degrees = degrees(&graph);
		let tiers = degrees
			.iter()
			.map(|d| NodeTier::classify(d.outgoing, &config.tiers))
			.collect();
		let labels = graph
			.nodes()
			.iter()
			.map(|n| truncate_label(&n.label, config.label_max_chars))
			.collect();
		let sim = Simulation::new(graph.node_count(), &edges, config.forces);

		let state = Self {
			transform: default_transform(&config, width, height),
			config,
			drag: DragState::default(),
			pan: PanState::default(),
			selection: None,
			tooltip: None,
			labels_visible: true,
			highlight_t: 0.0,
			width,
			height,
			graph,
			sim,
			edges,
			degrees,
			tiers,
			labels,
			hovered: None,
			transition: None,
			limit_report,
		};
		log::info!("Render session {:?}", state.phase());
		state
	}

	pub fn phase(&self) -> SessionPhase {
		match self.sim.phase() {
			SimulationPhase::Settling => SessionPhase::Settling,
			SimulationPhase::Resting => SessionPhase::Resting,
		}
	}

	pub fn graph(&self) -> &CallGraph {
		&self.graph
	}

	pub fn limit_report(&self) -> LimitReport {
		self.limit_report
	}

	/// Node and edge counts of the graph actually rendered.
	pub fn counts(&self) -> (usize, usize) {
		(self.graph.node_count(), self.graph.edge_count())
	}

	pub fn nodes(&self) -> &[SimNode] {
		self.sim.nodes()
	}

	pub fn edges(&self) -> &[(usize, usize)] {
		&self.edges
	}

	pub fn tier(&self, idx: usize) -> NodeTier {
		self.tiers[idx]
	}

	pub fn tier_color(&self, idx: usize) -> &str {
		self.tiers[idx].color(&self.config.tiers)
	}

	pub fn degrees(&self, idx: usize) -> Degrees {
		self.degrees[idx]
	}

	/// Label as drawn next to the node, possibly truncated.
	pub fn display_label(&self, idx: usize) -> &str {
		&self.labels[idx]
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under a screen position. Later nodes draw on top.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		// HIT_RADIUS is in world-space, scales with zoom like nodes
		self.sim
			.nodes()
			.iter()
			.rposition(|node| ((node.x - gx).powi(2) + (node.y - gy).powi(2)).sqrt() < HIT_RADIUS)
	}

	pub fn begin_drag(&mut self, idx: usize) {
		let Some(node) = self.sim.node(idx) else {
			return;
		};
		let (x, y) = (node.x, node.y);
		self.drag = DragState {
			node: Some(idx),
			..DragState::default()
		};
		self.sim.reheat(self.config.forces.drag_alpha_target);
		self.sim.pin(idx, x, y);
	}

	/// Pin the dragged node under the cursor.
	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		let Some(idx) = self.drag.node else {
			return;
		};
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.drag.moved = true;
		self.sim.pin(idx, gx, gy);
	}

	pub fn end_drag(&mut self) {
		let Some(idx) = self.drag.node.take() else {
			return;
		};
		self.drag.suppress_click = self.drag.moved;
		self.sim.cool();
		self.sim.unpin(idx);
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.node.is_some()
	}

	/// True once after a drag that moved its node, so the trailing click
	/// does not count as a selection.
	pub fn take_click_suppression(&mut self) -> bool {
		std::mem::take(&mut self.drag.suppress_click)
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.transition = None;
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		if !self.pan.active {
			return;
		}
		self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
		self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
	}

	pub fn end_pan(&mut self) {
		self.pan.active = false;
	}

	/// Wheel zoom about the cursor, applied immediately.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		self.transition = None;
		let base = self.transform;
		self.transform = self.scaled_about(&base, sx, sy, factor);
	}

	pub fn zoom_in(&mut self) {
		self.zoom_by(self.config.view.zoom_in_step);
	}

	pub fn zoom_out(&mut self) {
		self.zoom_by(self.config.view.zoom_out_step);
	}

	/// Smoothly scale about the viewport center. Repeated presses compound
	/// on the pending target rather than the in-flight transform.
	pub fn zoom_by(&mut self, factor: f64) {
		let base = self
			.transition
			.as_ref()
			.map(|t| t.to)
			.unwrap_or(self.transform);
		let to = self.scaled_about(&base, self.width / 2.0, self.height / 2.0, factor);
		self.transition_to(to);
	}

	/// Smoothly return to the default half-scale view.
	pub fn reset_view(&mut self) {
		let to = default_transform(&self.config, self.width, self.height);
		self.transition_to(to);
	}

	/// Target of the running camera transition, or the current transform.
	pub fn target_transform(&self) -> ViewTransform {
		self.transition
			.as_ref()
			.map(|t| t.to)
			.unwrap_or(self.transform)
	}

	fn scaled_about(&self, base: &ViewTransform, px: f64, py: f64, factor: f64) -> ViewTransform {
		let view = &self.config.view;
		// unlike clamp, tolerates an inverted range from an unchecked config
		let k = (base.k * factor).min(view.max_scale).max(view.min_scale);
		let ratio = k / base.k;
		ViewTransform {
			x: px - (px - base.x) * ratio,
			y: py - (py - base.y) * ratio,
			k,
		}
	}

	fn transition_to(&mut self, to: ViewTransform) {
		let duration = self.config.view.transition_secs;
		if duration <= 0.0 {
			self.transform = to;
			self.transition = None;
			return;
		}
		self.transition = Some(ViewTransition {
			from: self.transform,
			to,
			elapsed: 0.0,
			duration,
		});
	}

	/// Show or move the tooltip for `node`; `None` hides it.
	pub fn hover(&mut self, node: Option<usize>, sx: f64, sy: f64) {
		self.hovered = node;
		self.tooltip = node.map(|idx| Tooltip {
			label: self.graph.nodes()[idx].label.clone(),
			degrees: self.degrees[idx],
			x: sx + TOOLTIP_OFFSET.0,
			y: sy + TOOLTIP_OFFSET.1,
		});
	}

	pub fn hovered(&self) -> Option<usize> {
		self.hovered
	}

	/// Replace any previous highlight with `idx` and its neighbors.
	pub fn select(&mut self, idx: usize) {
		let neighbors = self
			.edges
			.iter()
			.filter_map(|&(src, tgt)| match (src == idx, tgt == idx) {
				(true, false) => Some(tgt),
				(false, true) => Some(src),
				_ => None,
			})
			.collect();
		self.selection = Some(Selection {
			node: idx,
			neighbors,
		});
		self.highlight_t = 0.0;
	}

	/// Click on a node: highlight it and show its tooltip.
	pub fn click_node(&mut self, idx: usize, sx: f64, sy: f64) {
		self.select(idx);
		self.hover(Some(idx), sx, sy);
	}

	pub fn node_role(&self, idx: usize) -> NodeRole {
		match &self.selection {
			Some(sel) if sel.node == idx => NodeRole::Selected,
			Some(sel) if sel.neighbors.contains(&idx) => NodeRole::Neighbor,
			_ => NodeRole::Plain,
		}
	}

	pub fn edge_role(&self, src: usize, tgt: usize) -> EdgeRole {
		match &self.selection {
			Some(sel) if sel.node == src => EdgeRole::Outgoing,
			Some(sel) if sel.node == tgt => EdgeRole::Incoming,
			_ => EdgeRole::Plain,
		}
	}

	/// Center the camera on the first node whose label contains `query`,
	/// ignoring case, and highlight it. Nothing changes when no node matches.
	pub fn search(&mut self, query: &str) -> SearchOutcome {
		let needle = query.trim().to_lowercase();
		if needle.is_empty() {
			return SearchOutcome::NoMatch;
		}
		let Some(idx) = self
			.graph
			.nodes()
			.iter()
			.position(|n| n.label.to_lowercase().contains(&needle))
		else {
			log::debug!("Search '{}' matched no nodes", query);
			return SearchOutcome::NoMatch;
		};

		let node = &self.sim.nodes()[idx];
		let k = self.target_transform().k;
		let to = ViewTransform {
			x: self.width / 2.0 - node.x * k,
			y: self.height / 2.0 - node.y * k,
			k,
		};
		self.transition_to(to);
		self.select(idx);
		let label = self.graph.nodes()[idx].label.clone();
		log::debug!("Search '{}' focused {}", query, label);
		SearchOutcome::Focused { index: idx, label }
	}

	/// Flip label visibility; returns the new setting.
	pub fn toggle_labels(&mut self) -> bool {
		self.labels_visible = !self.labels_visible;
		self.labels_visible
	}

	pub fn tick(&mut self, dt: f64) {
		let before = self.sim.phase();
		if self.sim.step() != before {
			log::debug!("Render session {:?}", self.phase());
		}

		if let Some(mut tr) = self.transition.take() {
			tr.elapsed += dt;
			let t = tr.elapsed / tr.duration;
			if t >= 1.0 {
				self.transform = tr.to;
			} else {
				self.transform = tr.from.lerp(&tr.to, ease_out_cubic(t));
				self.transition = Some(tr);
			}
		}

		let target = if self.selection.is_some() { 1.0 } else { 0.0 };
		self.highlight_t += (target - self.highlight_t) * (6.0 * dt).min(1.0);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

fn default_transform(config: &GraphConfig, width: f64, height: f64) -> ViewTransform {
	ViewTransform {
		x: width / 2.0,
		y: height / 2.0,
		k: config.view.default_scale,
	}
}

pub fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

#[cfg(test)]
mod tests {
	use rstest::{fixture, rstest};

	use super::*;
	use crate::graph::{parse, sample_graph};

	const W: f64 = 800.0;
	const H: f64 = 600.0;

	#[fixture]
	fn sample_state() -> ForceGraphState {
		ForceGraphState::new(&sample_graph(), GraphConfig::default(), W, H)
	}

	fn settle(state: &mut ForceGraphState) {
		for _ in 0..600 {
			state.tick(0.016);
		}
	}

	fn screen_pos(state: &ForceGraphState, idx: usize) -> (f64, f64) {
		let node = &state.nodes()[idx];
		(
			node.x * state.transform.k + state.transform.x,
			node.y * state.transform.k + state.transform.y,
		)
	}

	#[rstest]
	fn sample_counters(sample_state: ForceGraphState) {
		assert_eq!(sample_state.counts(), (6, 5));
		assert_eq!(sample_state.phase(), SessionPhase::Settling);
		assert!(!sample_state.limit_report().truncated());
	}

	#[test]
	fn fresh_sessions_classify_identically() {
		let graph = parse(
			"=== FUNCTION CALL GRAPH ===\nhub --> a, b, c, d, e, f, g, h, i, j, k\nbusy --> a, b, c, d, e, f\na --> b",
		);
		let first = ForceGraphState::new(&graph, GraphConfig::default(), W, H);
		let second = ForceGraphState::new(&graph, GraphConfig::default(), W, H);
		let tiers = |s: &ForceGraphState| (0..s.counts().0).map(|i| s.tier(i)).collect::<Vec<_>>();
		assert_eq!(tiers(&first), tiers(&second));
		assert_eq!(first.counts(), second.counts());
		assert_eq!(first.tier(0), NodeTier::Hub);
		assert_eq!(first.tier(first.graph().index_of("busy").unwrap()), NodeTier::Busy);
		assert_eq!(first.tier(first.graph().index_of("a").unwrap()), NodeTier::Connected);
		assert_eq!(first.tier(first.graph().index_of("k").unwrap()), NodeTier::Leaf);
	}

	#[test]
	fn oversized_graph_is_limited_before_rendering() {
		let mut graph = CallGraph::new();
		for i in 0..700 {
			graph.add_edge(&format!("f{i}"), &format!("f{}", (i + 1) % 700));
		}
		let state = ForceGraphState::new(&graph, GraphConfig::default(), W, H);
		let (nodes, edges) = state.counts();
		assert_eq!(nodes, 500);
		assert!(edges <= 1000);
		assert_eq!(state.nodes().len(), 500);
		assert!(state.edges().iter().all(|&(s, t)| s < 500 && t < 500));
	}

	#[rstest]
	fn search_without_match_changes_nothing(mut sample_state: ForceGraphState) {
		sample_state.zoom_at(100.0, 100.0, 2.0);
		let transform = sample_state.transform;
		let graph = sample_state.graph().clone();

		assert_eq!(sample_state.search("no_such_function"), SearchOutcome::NoMatch);
		assert_eq!(sample_state.search("   "), SearchOutcome::NoMatch);
		assert_eq!(sample_state.transform, transform);
		assert_eq!(sample_state.target_transform(), transform);
		assert_eq!(sample_state.graph(), &graph);
		assert!(sample_state.selection.is_none());
	}

	#[rstest]
	fn search_focuses_first_match(mut sample_state: ForceGraphState) {
		settle(&mut sample_state);
		let outcome = sample_state.search("APP.PY");
		let idx = sample_state.graph().index_of("app.py::run").unwrap();
		assert_eq!(
			outcome,
			SearchOutcome::Focused {
				index: idx,
				label: "app.py::run".into()
			}
		);
		assert_eq!(sample_state.node_role(idx), NodeRole::Selected);

		for _ in 0..60 {
			sample_state.tick(0.016);
		}
		let (sx, sy) = screen_pos(&sample_state, idx);
		assert!((sx - W / 2.0).abs() < 1e-6 && (sy - H / 2.0).abs() < 1e-6);
	}

	#[rstest]
	fn zoom_buttons_step_and_clamp(mut sample_state: ForceGraphState) {
		sample_state.zoom_in();
		assert!((sample_state.target_transform().k - 0.65).abs() < 1e-9);
		// transition has not run yet
		assert_eq!(sample_state.transform.k, 0.5);
		for _ in 0..40 {
			sample_state.tick(0.016);
		}
		assert!((sample_state.transform.k - 0.65).abs() < 1e-9);

		for _ in 0..30 {
			sample_state.zoom_in();
		}
		assert_eq!(sample_state.target_transform().k, 8.0);
		for _ in 0..60 {
			sample_state.zoom_out();
		}
		assert_eq!(sample_state.target_transform().k, 0.1);
	}

	#[test]
	fn inverted_zoom_range_does_not_panic() {
		let mut config = GraphConfig::default();
		config.view.min_scale = 10.0;
		let mut state = ForceGraphState::new(&sample_graph(), config, W, H);
		state.zoom_in();
		state.zoom_at(10.0, 10.0, 0.9);
		assert!(state.target_transform().k.is_finite());
	}

	#[rstest]
	fn wheel_zoom_keeps_cursor_point_fixed(mut sample_state: ForceGraphState) {
		let before = sample_state.screen_to_graph(300.0, 200.0);
		sample_state.zoom_at(300.0, 200.0, 1.1);
		let after = sample_state.screen_to_graph(300.0, 200.0);
		assert!((before.0 - after.0).abs() < 1e-9 && (before.1 - after.1).abs() < 1e-9);
	}

	#[rstest]
	fn reset_returns_to_default_view(mut sample_state: ForceGraphState) {
		sample_state.begin_pan(0.0, 0.0);
		sample_state.pan_to(120.0, -35.0);
		sample_state.end_pan();
		sample_state.zoom_at(10.0, 10.0, 3.0);
		sample_state.reset_view();
		for _ in 0..40 {
			sample_state.tick(0.016);
		}
		assert_eq!(
			sample_state.transform,
			ViewTransform {
				x: W / 2.0,
				y: H / 2.0,
				k: 0.5
			}
		);
	}

	#[rstest]
	fn drag_pins_under_cursor_and_reheats(mut sample_state: ForceGraphState) {
		settle(&mut sample_state);
		assert_eq!(sample_state.phase(), SessionPhase::Resting);

		let (sx, sy) = screen_pos(&sample_state, 2);
		assert_eq!(sample_state.node_at_position(sx, sy), Some(2));
		sample_state.begin_drag(2);
		assert_eq!(sample_state.phase(), SessionPhase::Settling);

		sample_state.drag_to(500.0, 420.0);
		sample_state.tick(0.016);
		let (gx, gy) = sample_state.screen_to_graph(500.0, 420.0);
		let node = &sample_state.nodes()[2];
		assert_eq!((node.x, node.y), (gx, gy));

		sample_state.end_drag();
		assert_eq!(sample_state.nodes()[2].fx, None);
		assert!(sample_state.take_click_suppression());
		assert!(!sample_state.take_click_suppression());
		settle(&mut sample_state);
		assert_eq!(sample_state.phase(), SessionPhase::Resting);
	}

	#[rstest]
	fn click_highlights_edges_and_neighbors(mut sample_state: ForceGraphState) {
		let graph = sample_state.graph().clone();
		let run = graph.index_of("app.py::run").unwrap();
		let main = graph.index_of("main.py::main").unwrap();
		let handle = graph.index_of("app.py::handle_request").unwrap();
		let format = graph.index_of("utils.py::format_response").unwrap();

		sample_state.click_node(main, 0.0, 0.0);
		sample_state.click_node(run, 40.0, 50.0);

		assert_eq!(sample_state.node_role(run), NodeRole::Selected);
		assert_eq!(sample_state.node_role(main), NodeRole::Neighbor);
		assert_eq!(sample_state.node_role(handle), NodeRole::Neighbor);
		assert_eq!(sample_state.node_role(format), NodeRole::Plain);
		assert_eq!(sample_state.edge_role(main, run), EdgeRole::Incoming);
		assert_eq!(sample_state.edge_role(run, handle), EdgeRole::Outgoing);
		assert_eq!(sample_state.edge_role(handle, format), EdgeRole::Plain);

		let tooltip = sample_state.tooltip.clone().unwrap();
		assert_eq!(tooltip.label, "app.py::run");
		assert_eq!(
			tooltip.degrees,
			Degrees {
				incoming: 1,
				outgoing: 2
			}
		);
		assert_eq!((tooltip.x, tooltip.y), (50.0, 22.0));
	}

	#[rstest]
	fn hover_out_hides_tooltip(mut sample_state: ForceGraphState) {
		sample_state.hover(Some(0), 10.0, 10.0);
		assert!(sample_state.tooltip.is_some());
		sample_state.hover(None, 10.0, 10.0);
		assert!(sample_state.tooltip.is_none());
	}

	#[rstest]
	fn labels_toggle(mut sample_state: ForceGraphState) {
		assert!(sample_state.labels_visible);
		assert!(!sample_state.toggle_labels());
		assert!(sample_state.toggle_labels());
	}
}
