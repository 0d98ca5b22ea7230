use crate::config::TierPolicy;
use crate::graph::CallGraph;

/// Incoming and outgoing edge counts of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Degrees {
	pub incoming: usize,
	pub outgoing: usize,
}

/// Per-node degrees, indexed like `graph.nodes()`.
pub fn degrees(graph: &CallGraph) -> Vec<Degrees> {
	let mut out = vec![Degrees::default(); graph.node_count()];
	for (src, tgt) in graph.edge_indices() {
		out[src].outgoing += 1;
		out[tgt].incoming += 1;
	}
	out
}

/// Color class of a node, by how many calls it makes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeTier {
	Hub,
	Busy,
	Connected,
	Leaf,
}

impl NodeTier {
	pub fn classify(outgoing: usize, policy: &TierPolicy) -> Self {
		if outgoing > policy.hub_above {
			Self::Hub
		} else if outgoing >= policy.busy_from {
			Self::Busy
		} else if outgoing >= policy.connected_from {
			Self::Connected
		} else {
			Self::Leaf
		}
	}

	pub fn color(self, policy: &TierPolicy) -> &str {
		match self {
			Self::Hub => &policy.hub_color,
			Self::Busy => &policy.busy_color,
			Self::Connected => &policy.connected_color,
			Self::Leaf => &policy.leaf_color,
		}
	}
}

/// Cut `label` to `max_chars` characters, ending in `...` when shortened.
pub fn truncate_label(label: &str, max_chars: usize) -> String {
	if label.chars().count() <= max_chars {
		return label.to_string();
	}
	let keep = max_chars.saturating_sub(3);
	let mut out: String = label.chars().take(keep).collect();
	out.push_str("...");
	out
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case(0, NodeTier::Leaf)]
	#[case(1, NodeTier::Connected)]
	#[case(5, NodeTier::Connected)]
	#[case(6, NodeTier::Busy)]
	#[case(10, NodeTier::Busy)]
	#[case(11, NodeTier::Hub)]
	#[case(40, NodeTier::Hub)]
	fn tiers_follow_outgoing_count(#[case] outgoing: usize, #[case] tier: NodeTier) {
		assert_eq!(NodeTier::classify(outgoing, &TierPolicy::default()), tier);
	}

	#[test]
	fn degrees_count_both_directions() {
		let mut graph = CallGraph::new();
		graph.add_edge("a", "b");
		graph.add_edge("a", "c");
		graph.add_edge("c", "a");
		let d = degrees(&graph);
		assert_eq!(d[0], Degrees { incoming: 1, outgoing: 2 });
		assert_eq!(d[1], Degrees { incoming: 1, outgoing: 0 });
		assert_eq!(d[2], Degrees { incoming: 1, outgoing: 1 });
	}

	#[rstest]
	#[case("short", "short")]
	#[case("exactly_twenty_five_chars", "exactly_twenty_five_chars")]
	#[case("handlers/requests.py::dispatch_all", "handlers/requests.py::...")]
	#[case("ééééééééééééééééééééééééééé", "éééééééééééééééééééééé...")]
	fn labels_truncate_to_25_chars(#[case] label: &str, #[case] expected: &str) {
		let out = truncate_label(label, 25);
		assert_eq!(out, expected);
		assert!(out.chars().count() <= 25);
	}
}
