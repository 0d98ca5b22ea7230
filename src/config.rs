//! Policy constants for a graph view.
//!
//! Every field has a default, so a host can override a single value in a
//! JSON message and leave the rest alone.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Complete configuration of one graph view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
	pub limits: SizeLimits,
	pub tiers: TierPolicy,
	pub forces: ForceParams,
	pub view: ViewParams,
	pub highlight: HighlightPalette,
	/// Longer labels are cut to `label_max_chars - 3` chars plus `...`.
	pub label_max_chars: usize,
	pub export_file_name: String,
}

impl GraphConfig {
	/// Reject values the view cannot work with, such as an empty zoom range
	/// or a non-finite step.
	pub fn validate(&self) -> Result<(), ConfigError> {
		self.view.validate()?;
		self.forces.validate()?;
		let tiers = &self.tiers;
		if tiers.busy_from > tiers.hub_above + 1 {
			return Err(ConfigError::new(
				"tiers.busy_from",
				format!("{} exceeds hub_above + 1 ({})", tiers.busy_from, tiers.hub_above + 1),
			));
		}
		if tiers.connected_from > tiers.busy_from {
			return Err(ConfigError::new(
				"tiers.connected_from",
				format!("{} exceeds busy_from ({})", tiers.connected_from, tiers.busy_from),
			));
		}
		if self.label_max_chars < 4 {
			return Err(ConfigError::new("label_max_chars", "must be at least 4"));
		}
		Ok(())
	}
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
	if value.is_finite() && value > 0.0 {
		Ok(())
	} else {
		Err(ConfigError::new(field, format!("{value} is not a positive number")))
	}
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			limits: SizeLimits::default(),
			tiers: TierPolicy::default(),
			forces: ForceParams::default(),
			view: ViewParams::default(),
			highlight: HighlightPalette::default(),
			label_max_chars: 25,
			export_file_name: "graph.svg".into(),
		}
	}
}

/// Hard caps that keep the simulation interactive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeLimits {
	/// Keep at most this many nodes, ranked by usage score.
	pub max_nodes: usize,
	/// Keep at most this many of the surviving edges, in input order.
	pub max_edges: usize,
}

impl Default for SizeLimits {
	fn default() -> Self {
		Self {
			max_nodes: 500,
			max_edges: 1000,
		}
	}
}

/// Out-degree thresholds and colors of the four node tiers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierPolicy {
	/// Out-degree strictly above this is a hub.
	pub hub_above: usize,
	/// Out-degree from this up to `hub_above` is busy.
	pub busy_from: usize,
	/// Out-degree from this up to `busy_from - 1` is connected; below is a leaf.
	pub connected_from: usize,
	pub hub_color: String,
	pub busy_color: String,
	pub connected_color: String,
	pub leaf_color: String,
}

impl Default for TierPolicy {
	fn default() -> Self {
		Self {
			hub_above: 10,
			busy_from: 6,
			connected_from: 1,
			hub_color: "#e74c3c".into(),
			busy_color: "#f39c12".into(),
			connected_color: "#2ecc71".into(),
			leaf_color: "#3498db".into(),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceParams {
	/// Rest length of the edge springs.
	pub link_distance: f64,
	/// Many-body strength; negative repels.
	pub charge: f64,
	pub center_strength: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// Below this energy the simulation rests.
	pub alpha_min: f64,
	/// Cooling rate per tick. Unset means "reach `alpha_min` in 300 ticks",
	/// whatever `alpha_min` is.
	pub alpha_decay: Option<f64>,
	/// Energy the simulation is held at while a node is dragged.
	pub drag_alpha_target: f64,
}

impl Default for ForceParams {
	fn default() -> Self {
		Self {
			link_distance: 100.0,
			charge: -300.0,
			center_strength: 1.0,
			velocity_decay: 0.4,
			alpha_min: 0.001,
			alpha_decay: None,
			drag_alpha_target: 0.3,
		}
	}
}

impl ForceParams {
	const SETTLE_TICKS: f64 = 300.0;

	fn validate(&self) -> Result<(), ConfigError> {
		for (field, value) in [
			("forces.link_distance", self.link_distance),
			("forces.charge", self.charge),
			("forces.center_strength", self.center_strength),
			("forces.velocity_decay", self.velocity_decay),
			("forces.drag_alpha_target", self.drag_alpha_target),
		] {
			if !value.is_finite() {
				return Err(ConfigError::new(field, format!("{value} is not finite")));
			}
		}
		if !(self.alpha_min > 0.0 && self.alpha_min < 1.0) {
			return Err(ConfigError::new("forces.alpha_min", "must lie strictly between 0 and 1"));
		}
		if let Some(decay) = self.alpha_decay {
			if !(decay > 0.0 && decay <= 1.0) {
				return Err(ConfigError::new("forces.alpha_decay", "must lie in (0, 1]"));
			}
		}
		Ok(())
	}

	/// Effective cooling rate.
	pub fn alpha_decay(&self) -> f64 {
		self.alpha_decay
			.unwrap_or_else(|| 1.0 - self.alpha_min.powf(1.0 / Self::SETTLE_TICKS))
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewParams {
	pub min_scale: f64,
	pub max_scale: f64,
	pub zoom_in_step: f64,
	pub zoom_out_step: f64,
	/// Scale of the initial and reset views.
	pub default_scale: f64,
	/// Duration of camera transitions in seconds.
	pub transition_secs: f64,
}

impl Default for ViewParams {
	fn default() -> Self {
		Self {
			min_scale: 0.1,
			max_scale: 8.0,
			zoom_in_step: 1.3,
			zoom_out_step: 0.7,
			default_scale: 0.5,
			transition_secs: 0.5,
		}
	}
}

impl ViewParams {
	fn validate(&self) -> Result<(), ConfigError> {
		positive("view.min_scale", self.min_scale)?;
		positive("view.max_scale", self.max_scale)?;
		positive("view.zoom_in_step", self.zoom_in_step)?;
		positive("view.zoom_out_step", self.zoom_out_step)?;
		positive("view.default_scale", self.default_scale)?;
		if self.min_scale > self.max_scale {
			return Err(ConfigError::new(
				"view.min_scale",
				format!("{} is above max_scale {}", self.min_scale, self.max_scale),
			));
		}
		if !(self.min_scale..=self.max_scale).contains(&self.default_scale) {
			return Err(ConfigError::new(
				"view.default_scale",
				format!("{} is outside {}..={}", self.default_scale, self.min_scale, self.max_scale),
			));
		}
		if !self.transition_secs.is_finite() || self.transition_secs < 0.0 {
			return Err(ConfigError::new("view.transition_secs", "must be finite and not negative"));
		}
		Ok(())
	}
}

/// Colors used by click-to-highlight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightPalette {
	pub selected: String,
	/// Edges ending at the selected node.
	pub incoming: String,
	/// Edges leaving the selected node.
	pub outgoing: String,
	pub neighbor: String,
}

impl Default for HighlightPalette {
	fn default() -> Self {
		Self {
			selected: "#ffd700".into(),
			incoming: "#ff6b6b".into(),
			outgoing: "#4ecdc4".into(),
			neighbor: "#c39bd3".into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[test]
	fn partial_json_keeps_other_defaults() {
		let config: GraphConfig =
			serde_json::from_str(r#"{"limits": {"max_nodes": 50}, "label_max_chars": 12}"#)
				.unwrap();
		assert_eq!(config.limits.max_nodes, 50);
		assert_eq!(config.limits.max_edges, 1000);
		assert_eq!(config.label_max_chars, 12);
		assert_eq!(config.forces, ForceParams::default());
		assert_eq!(config.validate(), Ok(()));
	}

	#[rstest]
	#[case::inverted_zoom_range(r#"{"view": {"min_scale": 10.0}}"#, "view.min_scale")]
	#[case::zero_step(r#"{"view": {"zoom_out_step": 0.0}}"#, "view.zoom_out_step")]
	#[case::default_outside_range(r#"{"view": {"default_scale": 9.0}}"#, "view.default_scale")]
	#[case::busy_above_hub(r#"{"tiers": {"busy_from": 12}}"#, "tiers.busy_from")]
	#[case::alpha_min_out_of_range(r#"{"forces": {"alpha_min": 1.5}}"#, "forces.alpha_min")]
	fn invalid_overrides_are_rejected(#[case] json: &str, #[case] field: &str) {
		let config: GraphConfig = serde_json::from_str(json).unwrap();
		let err = config.validate().unwrap_err();
		assert_eq!(err.field(), field);
	}

	#[test]
	fn non_finite_scale_is_rejected() {
		let mut config = GraphConfig::default();
		config.view.max_scale = f64::NAN;
		assert_eq!(config.validate().unwrap_err().field(), "view.max_scale");
	}

	#[rstest]
	#[case(0.001)]
	#[case(0.01)]
	fn overridden_alpha_min_keeps_the_settle_time(#[case] alpha_min: f64) {
		let json = format!(r#"{{"forces": {{"alpha_min": {alpha_min}}}}}"#);
		let config: GraphConfig = serde_json::from_str(&json).unwrap();
		assert_eq!(config.forces.alpha_min, alpha_min);
		let ticks = ticks_to_settle(&config.forces);
		assert!((299..=301).contains(&ticks), "ticks = {ticks}");
	}

	#[test]
	fn explicit_alpha_decay_wins() {
		let config: GraphConfig =
			serde_json::from_str(r#"{"forces": {"alpha_decay": 0.5}}"#).unwrap();
		assert_eq!(config.forces.alpha_decay(), 0.5);
		assert_eq!(ticks_to_settle(&config.forces), 10);
	}

	fn ticks_to_settle(forces: &ForceParams) -> usize {
		let mut alpha = 1.0;
		let mut ticks = 0;
		while alpha >= forces.alpha_min {
			alpha += (0.0 - alpha) * forces.alpha_decay();
			ticks += 1;
		}
		ticks
	}

	#[test]
	fn alpha_decay_settles_in_about_300_ticks() {
		let ticks = ticks_to_settle(&ForceParams::default());
		assert!((299..=301).contains(&ticks), "ticks = {ticks}");
	}
}
