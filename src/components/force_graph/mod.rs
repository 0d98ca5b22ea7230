mod component;
mod export;
mod render;
mod runtime;
mod simulation;
mod state;
mod svg;
mod types;

pub use component::ForceGraphCanvas;
pub use runtime::CanvasRuntime;
pub use simulation::{SimNode, Simulation, SimulationPhase};
pub use state::{
	EdgeRole, ForceGraphState, NodeRole, SearchOutcome, SessionPhase, Tooltip, ViewTransform,
};
pub use svg::export_document;
pub use types::{Degrees, NodeTier, degrees, truncate_label};
