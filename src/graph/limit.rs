use std::collections::HashSet;

use super::model::CallGraph;
use crate::config::SizeLimits;

/// What [`limit_graph`] dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LimitReport {
	pub nodes_dropped: usize,
	pub edges_dropped: usize,
}

impl LimitReport {
	pub fn truncated(&self) -> bool {
		self.nodes_dropped > 0 || self.edges_dropped > 0
	}
}

/// Apply the node and edge caps.
///
/// Over `max_nodes`, nodes are ranked by usage score (edges touching them
/// in either direction), ties kept in original order, and only edges with
/// both ends among the survivors remain. Over `max_edges`, the first
/// `max_edges` surviving edges are kept.
pub fn limit_graph(graph: &CallGraph, limits: &SizeLimits) -> (CallGraph, LimitReport) {
	let mut kept: Vec<usize> = (0..graph.node_count()).collect();

	if graph.node_count() > limits.max_nodes {
		let mut usage = vec![0usize; graph.node_count()];
		for (src, tgt) in graph.edge_indices() {
			usage[src] += 1;
			usage[tgt] += 1;
		}
		// sort_by is stable, so equal scores stay in insertion order
		kept.sort_by(|&a, &b| usage[b].cmp(&usage[a]));
		kept.truncate(limits.max_nodes);
	}

	let survivors: HashSet<usize> = kept.iter().copied().collect();
	let mut limited = CallGraph::new();
	for &idx in &kept {
		let node = &graph.nodes()[idx];
		limited.add_labeled_node(&node.id, &node.label);
	}

	let mut surviving_edges = 0;
	for (edge, (src, tgt)) in graph.edges().iter().zip(graph.edge_indices()) {
		if !survivors.contains(&src) || !survivors.contains(&tgt) {
			continue;
		}
		surviving_edges += 1;
		if limited.edge_count() < limits.max_edges {
			limited.add_edge(&edge.source, &edge.target);
		}
	}

	let report = LimitReport {
		nodes_dropped: graph.node_count() - limited.node_count(),
		edges_dropped: graph.edge_count() - limited.edge_count(),
	};
	if report.truncated() {
		log::info!(
			"Graph limited to {} nodes and {} edges ({} nodes, {} edges dropped; {} edges survived node cut)",
			limited.node_count(),
			limited.edge_count(),
			report.nodes_dropped,
			report.edges_dropped,
			surviving_edges
		);
	}
	(limited, report)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn star_graph(hubs: usize, leaves_per_hub: usize) -> CallGraph {
		let mut graph = CallGraph::new();
		for h in 0..hubs {
			for l in 0..leaves_per_hub {
				graph.add_edge(&format!("hub{h}"), &format!("leaf{h}_{l}"));
			}
		}
		graph
	}

	#[test]
	fn small_graph_is_untouched() {
		let graph = star_graph(3, 4);
		let (limited, report) = limit_graph(&graph, &SizeLimits::default());
		assert_eq!(limited, graph);
		assert!(!report.truncated());
	}

	#[test]
	fn keeps_exactly_max_nodes_ranked_by_usage() {
		let mut graph = CallGraph::new();
		// 600 isolated nodes, then a few well-used ones at the end
		for i in 0..600 {
			graph.add_node(&format!("n{i}"));
		}
		graph.add_edge("n599", "n598");
		graph.add_edge("n599", "n597");
		graph.add_edge("n10", "n599");

		let limits = SizeLimits {
			max_nodes: 500,
			max_edges: 1000,
		};
		let (limited, report) = limit_graph(&graph, &limits);
		assert_eq!(limited.node_count(), 500);
		assert_eq!(report.nodes_dropped, 100);

		let ids: Vec<&str> = limited.nodes().iter().map(|n| n.id.as_str()).collect();
		assert_eq!(&ids[..5], &["n599", "n10", "n597", "n598", "n0"][..]);
		// remaining ties follow original order
		assert_eq!(ids[5], "n1");
		assert!(!ids.contains(&"n499"));
		assert_eq!(limited.edge_count(), 3);
	}

	#[test]
	fn retained_edges_have_both_endpoints() {
		let graph = star_graph(60, 10);
		let limits = SizeLimits {
			max_nodes: 100,
			max_edges: 1000,
		};
		let (limited, _) = limit_graph(&graph, &limits);
		assert_eq!(limited.node_count(), 100);
		for edge in limited.edges() {
			assert!(limited.index_of(&edge.source).is_some());
			assert!(limited.index_of(&edge.target).is_some());
		}
		assert_eq!(limited.edge_indices().count(), limited.edge_count());
	}

	#[test]
	fn edge_cap_keeps_first_surviving_edges() {
		let mut graph = CallGraph::new();
		for i in 0..1200 {
			graph.add_edge(&format!("s{}", i % 30), &format!("t{}", i % 40));
		}
		let (limited, report) = limit_graph(&graph, &SizeLimits::default());
		assert_eq!(limited.edge_count(), 1000);
		assert_eq!(report.edges_dropped, 200);
		assert_eq!(limited.edges(), &graph.edges()[..1000]);
	}
}
