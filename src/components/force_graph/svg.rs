//! Standalone SVG snapshot of a graph view.
//!
//! The document covers the whole laid-out graph, not just the visible
//! viewport, and carries the current highlight and label visibility.

use std::fmt::Write;

use super::state::{EdgeRole, ForceGraphState, NODE_RADIUS, NodeRole};

const PADDING: f64 = 40.0;
const EDGE_COLOR: &str = "#999999";

/// Render `state` as a complete SVG file, XML prolog included.
pub fn export_document(state: &ForceGraphState) -> String {
	let (min_x, min_y, width, height) = bounds(state);
	let palette = &state.config.highlight;
	let mut out = String::new();

	out.push_str("<?xml version=\"1.0\" standalone=\"no\"?>\r\n");
	let _ = writeln!(
		out,
		r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="{min_x:.2} {min_y:.2} {w:.2} {h:.2}">"#,
		w = width,
		h = height,
	);
	out.push_str("<defs>\n");
	for (id, color) in [
		("arrow", EDGE_COLOR),
		("arrow-incoming", palette.incoming.as_str()),
		("arrow-outgoing", palette.outgoing.as_str()),
	] {
		let _ = writeln!(
			out,
			r#"<marker id="{id}" viewBox="0 -5 10 10" refX="15" refY="0" markerWidth="6" markerHeight="6" orient="auto"><path fill="{color}" d="M0,-5L10,0L0,5"/></marker>"#,
			color = escape(color),
		);
	}
	out.push_str("</defs>\n");
	let _ = writeln!(
		out,
		r#"<rect x="{min_x:.2}" y="{min_y:.2}" width="{width:.2}" height="{height:.2}" fill="white"/>"#
	);

	out.push_str("<g class=\"links\">\n");
	let nodes = state.nodes();
	for &(src, tgt) in state.edges() {
		let (a, b) = (&nodes[src], &nodes[tgt]);
		let (color, marker) = match state.edge_role(src, tgt) {
			EdgeRole::Incoming => (palette.incoming.as_str(), "arrow-incoming"),
			EdgeRole::Outgoing => (palette.outgoing.as_str(), "arrow-outgoing"),
			EdgeRole::Plain => (EDGE_COLOR, "arrow"),
		};
		let _ = writeln!(
			out,
			r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="1.5" marker-end="url(#{marker})"/>"#,
			a.x,
			a.y,
			b.x,
			b.y,
			escape(color),
		);
	}
	out.push_str("</g>\n<g class=\"nodes\">\n");

	for (idx, node) in nodes.iter().enumerate() {
		let border = match state.node_role(idx) {
			NodeRole::Selected => format!(r#" stroke="{}" stroke-width="3""#, escape(&palette.selected)),
			NodeRole::Neighbor => format!(r#" stroke="{}" stroke-width="2""#, escape(&palette.neighbor)),
			NodeRole::Plain => String::new(),
		};
		let _ = write!(
			out,
			r#"<g class="node" transform="translate({:.2},{:.2})"><circle r="{NODE_RADIUS}" fill="{}"{border}/>"#,
			node.x,
			node.y,
			escape(state.tier_color(idx)),
		);
		if state.labels_visible {
			let _ = write!(
				out,
				r##"<text dx="12" dy=".35em" font-family="sans-serif" font-size="10" fill="#000000">{}</text>"##,
				escape(state.display_label(idx)),
			);
		}
		out.push_str("</g>\n");
	}
	out.push_str("</g>\n</svg>\n");
	out
}

fn bounds(state: &ForceGraphState) -> (f64, f64, f64, f64) {
	let nodes = state.nodes();
	if nodes.is_empty() {
		return (0.0, 0.0, state.width.max(1.0), state.height.max(1.0));
	}
	let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
	let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
	for node in nodes {
		min_x = min_x.min(node.x);
		min_y = min_y.min(node.y);
		max_x = max_x.max(node.x);
		max_y = max_y.max(node.y);
	}
	// labels extend to the right of their node
	let label_room = if state.labels_visible { 160.0 } else { 0.0 };
	(
		min_x - PADDING,
		min_y - PADDING,
		max_x - min_x + 2.0 * PADDING + label_room,
		max_y - min_y + 2.0 * PADDING,
	)
}

fn escape(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&apos;"),
			_ => out.push(c),
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::GraphConfig;
	use crate::graph::{parse, sample_graph};

	fn state_for(text: &str) -> ForceGraphState {
		ForceGraphState::new(&parse(text), GraphConfig::default(), 800.0, 600.0)
	}

	#[test]
	fn document_is_standalone_and_complete() {
		let mut state = ForceGraphState::new(&sample_graph(), GraphConfig::default(), 800.0, 600.0);
		for _ in 0..50 {
			state.tick(0.016);
		}
		let doc = export_document(&state);
		assert!(doc.starts_with(
			"<?xml version=\"1.0\" standalone=\"no\"?>\r\n<svg xmlns=\"http://www.w3.org/2000/svg\""
		));
		assert!(doc.trim_end().ends_with("</svg>"));
		assert_eq!(doc.matches("<circle").count(), 6);
		assert_eq!(doc.matches("<line").count(), 5);
		assert_eq!(doc.matches("<text").count(), 6);
		assert!(doc.contains("app.py::handle_request"));
	}

	#[test]
	fn labels_are_escaped_and_follow_visibility() {
		let mut state = state_for("=== FUNCTION CALL GRAPH ===\nvec<T>::push --> \"a&b\"");
		let doc = export_document(&state);
		assert!(doc.contains("vec&lt;T&gt;::push"));
		assert!(doc.contains("&quot;a&amp;b&quot;"));
		assert!(!doc.contains("vec<T>"));

		state.toggle_labels();
		assert_eq!(export_document(&state).matches("<text").count(), 0);
	}

	#[test]
	fn selection_is_carried_into_the_export() {
		let mut state = state_for("=== FUNCTION CALL GRAPH ===\nA --> B\nC --> A");
		state.select(0);
		let doc = export_document(&state);
		assert!(doc.contains("url(#arrow-outgoing)"));
		assert!(doc.contains("url(#arrow-incoming)"));
		assert!(doc.contains(r##"stroke="#ffd700" stroke-width="3""##));
	}

	#[test]
	fn empty_graph_exports_viewport_sized_document() {
		let state = state_for("no marker here");
		let doc = export_document(&state);
		assert!(doc.contains(r#"viewBox="0.00 0.00 800.00 600.00""#));
		assert_eq!(doc.matches("<circle").count(), 0);
	}
}
