use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::{EdgeRole, ForceGraphState, NODE_RADIUS, NodeRole, ease_out_cubic};

const BACKGROUND: &str = "#1a1a2e";
const EDGE_RGB: &str = "150, 150, 170";

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (line_width, arrow_size) = (1.5 / k.max(0.5), 8.0 / k.max(0.5));
	let t = ease_out_cubic(state.highlight_t);
	let nodes = state.nodes();
	let palette = &state.config.highlight;

	for &(src, tgt) in state.edges() {
		let (n1, n2) = (&nodes[src], &nodes[tgt]);
		let (dx, dy) = (n2.x - n1.x, n2.y - n1.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		// t=0: all edges at base alpha, t=1: highlighted opaque, others faded
		let (color, width) = match state.edge_role(src, tgt) {
			EdgeRole::Incoming => (palette.incoming.clone(), line_width * (1.0 + t)),
			EdgeRole::Outgoing => (palette.outgoing.clone(), line_width * (1.0 + t)),
			EdgeRole::Plain => (
				format!("rgba({EDGE_RGB}, {})", 0.6 - 0.45 * t),
				line_width,
			),
		};
		ctx.set_stroke_style_str(&color);
		ctx.set_fill_style_str(&color);
		ctx.set_line_width(width);

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(n1.x + ux * NODE_RADIUS, n1.y + uy * NODE_RADIUS);
		ctx.line_to(
			n2.x - ux * (NODE_RADIUS + arrow_size),
			n2.y - uy * (NODE_RADIUS + arrow_size),
		);
		ctx.stroke();

		let (tip_x, tip_y) = (n2.x - ux * NODE_RADIUS, n2.y - uy * NODE_RADIUS);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let (has_selection, t, k) = (
		state.selection.is_some(),
		ease_out_cubic(state.highlight_t),
		state.transform.k,
	);
	let palette = &state.config.highlight;
	let font = format!("{}px sans-serif", 10.0 / k.max(0.5));

	for (idx, node) in state.nodes().iter().enumerate() {
		let role = state.node_role(idx);
		let alpha = if has_selection && role == NodeRole::Plain {
			1.0 - 0.6 * t
		} else {
			1.0
		};

		if state.hovered() == Some(idx) {
			draw_glow(ctx, node.x, node.y);
		}

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, NODE_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(state.tier_color(idx));
		ctx.fill();

		let border = match role {
			NodeRole::Selected => Some((palette.selected.as_str(), 3.0)),
			NodeRole::Neighbor => Some((palette.neighbor.as_str(), 2.0)),
			NodeRole::Plain => None,
		};
		if let Some((color, width)) = border {
			ctx.set_stroke_style_str(color);
			ctx.set_line_width(width / k.max(0.5));
			ctx.stroke();
		}

		if state.labels_visible {
			ctx.set_fill_style_str("rgba(255, 255, 255, 0.85)");
			ctx.set_font(&font);
			let _ = ctx.fill_text(state.display_label(idx), node.x + NODE_RADIUS + 3.0, node.y + 3.0);
		}
		ctx.set_global_alpha(1.0);
	}
}

fn draw_glow(ctx: &CanvasRenderingContext2d, x: f64, y: f64) {
	let glow_radius = NODE_RADIUS * 2.6;
	let Ok(gradient) = ctx.create_radial_gradient(x, y, NODE_RADIUS * 0.3, x, y, glow_radius) else {
		return;
	};
	let _ = gradient.add_color_stop(0.0, "rgba(255, 255, 255, 0.35)");
	let _ = gradient.add_color_stop(0.6, "rgba(200, 220, 255, 0.1)");
	let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
	ctx.begin_path();
	let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill();
}
