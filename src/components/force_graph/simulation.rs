use std::f64::consts::PI;

use crate::config::ForceParams;

const INITIAL_RADIUS: f64 = 10.0;

/// Layout record of one node. `fx`/`fy` pin the node while it is dragged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimNode {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub fx: Option<f64>,
	pub fy: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationPhase {
	/// Energy above `alpha_min`; positions still change every tick.
	Settling,
	/// Energy has run out; ticks are no-ops until the next reheat.
	Resting,
}

struct Link {
	source: usize,
	target: usize,
	strength: f64,
	bias: f64,
}

/// Spring/charge/centering simulation cooled by an `alpha` schedule.
pub struct Simulation {
	nodes: Vec<SimNode>,
	links: Vec<Link>,
	params: ForceParams,
	alpha: f64,
	alpha_target: f64,
	phase: SimulationPhase,
}

impl Simulation {
	pub fn new(node_count: usize, edges: &[(usize, usize)], params: ForceParams) -> Self {
		let golden_angle = PI * (3.0 - 5f64.sqrt());
		let nodes = (0..node_count)
			.map(|i| {
				let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
				let angle = i as f64 * golden_angle;
				SimNode {
					x: radius * angle.cos(),
					y: radius * angle.sin(),
					..SimNode::default()
				}
			})
			.collect();

		let mut count = vec![0usize; node_count];
		for &(src, tgt) in edges {
			count[src] += 1;
			count[tgt] += 1;
		}
		// self-loops exert no force on their node
		let links = edges
			.iter()
			.filter(|(src, tgt)| src != tgt)
			.map(|&(source, target)| {
				let (cs, ct) = (count[source] as f64, count[target] as f64);
				Link {
					source,
					target,
					strength: 1.0 / cs.min(ct),
					bias: cs / (cs + ct),
				}
			})
			.collect();

		Self {
			nodes,
			links,
			params,
			alpha: 1.0,
			alpha_target: 0.0,
			phase: if node_count == 0 {
				SimulationPhase::Resting
			} else {
				SimulationPhase::Settling
			},
		}
	}

	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	pub fn node(&self, idx: usize) -> Option<&SimNode> {
		self.nodes.get(idx)
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn phase(&self) -> SimulationPhase {
		self.phase
	}

	/// Hold the energy near `target` and wake the simulation if it rested.
	pub fn reheat(&mut self, target: f64) {
		self.alpha_target = target;
		if !self.nodes.is_empty() {
			self.phase = SimulationPhase::Settling;
		}
	}

	/// Let the energy decay back towards zero.
	pub fn cool(&mut self) {
		self.alpha_target = 0.0;
	}

	pub fn pin(&mut self, idx: usize, x: f64, y: f64) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.fx = Some(x);
			node.fy = Some(y);
		}
	}

	pub fn unpin(&mut self, idx: usize) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.fx = None;
			node.fy = None;
		}
	}

	/// Advance one tick. Returns the phase after the tick.
	pub fn step(&mut self) -> SimulationPhase {
		if self.phase == SimulationPhase::Resting {
			return self.phase;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay();

		self.apply_links();
		self.apply_charge();
		self.apply_center();

		let decay = 1.0 - self.params.velocity_decay;
		for node in &mut self.nodes {
			match (node.fx, node.fy) {
				(Some(fx), Some(fy)) => {
					node.x = fx;
					node.y = fy;
					node.vx = 0.0;
					node.vy = 0.0;
				}
				_ => {
					node.vx *= decay;
					node.vy *= decay;
					node.x += node.vx;
					node.y += node.vy;
				}
			}
		}

		if self.alpha < self.params.alpha_min {
			self.phase = SimulationPhase::Resting;
			log::debug!("Simulation at rest");
		}
		self.phase
	}

	fn apply_links(&mut self) {
		let distance = self.params.link_distance;
		for link in &self.links {
			let (s, t) = (&self.nodes[link.source], &self.nodes[link.target]);
			let mut x = t.x + t.vx - s.x - s.vx;
			let mut y = t.y + t.vy - s.y - s.vy;
			let len = (x * x + y * y).sqrt();
			if len == 0.0 {
				continue;
			}
			let l = (len - distance) / len * self.alpha * link.strength;
			x *= l;
			y *= l;

			let t = &mut self.nodes[link.target];
			t.vx -= x * link.bias;
			t.vy -= y * link.bias;
			let s = &mut self.nodes[link.source];
			s.vx += x * (1.0 - link.bias);
			s.vy += y * (1.0 - link.bias);
		}
	}

	fn apply_charge(&mut self) {
		let strength = self.params.charge * self.alpha;
		let n = self.nodes.len();
		for i in 0..n {
			let (xi, yi) = (self.nodes[i].x, self.nodes[i].y);
			let (mut ax, mut ay) = (0.0, 0.0);
			for (j, other) in self.nodes.iter().enumerate() {
				if i == j {
					continue;
				}
				let (mut x, y) = (other.x - xi, other.y - yi);
				if x == 0.0 && y == 0.0 {
					// coincident nodes: nudge apart along x, direction by index
					x = if j > i { 1e-6 } else { -1e-6 };
				}
				// closer than one unit counts as one unit
				let l = (x * x + y * y).max(1.0);
				let w = strength / l;
				ax += x * w;
				ay += y * w;
			}
			self.nodes[i].vx += ax;
			self.nodes[i].vy += ay;
		}
	}

	fn apply_center(&mut self) {
		if self.nodes.is_empty() {
			return;
		}
		let n = self.nodes.len() as f64;
		let (sx, sy) = self
			.nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let (dx, dy) = (
			sx / n * self.params.center_strength,
			sy / n * self.params.center_strength,
		);
		for node in &mut self.nodes {
			node.x -= dx;
			node.y -= dy;
		}
	}
}
