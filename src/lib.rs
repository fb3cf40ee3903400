//! Force layout and rendering core for role relationship graphs.
//!
//! Raw role and relation records are aggregated into pair-keyed edges
//! ([`graph`]), laid out by an iterative force simulation ([`physics`]),
//! manipulated through pointer interaction ([`interaction`]) and turned into
//! host-agnostic draw commands ([`render`]). [`LayoutEngine`] ties the pieces
//! together for a host that drives one tick per frame.

pub mod config;
pub mod data;
pub mod engine;
pub mod graph;
pub mod interaction;
pub mod physics;
pub mod render;
mod util;

pub use config::{ConfigError, LayoutConfig};
pub use data::{DataError, RelationCatalog, Snapshot, load_snapshot, parse_snapshot};
pub use engine::{DataVersion, LayoutEngine};
pub use graph::{Edge, FactionId, Node, PairKey, RelationRecord, RoleGraph, RoleRecord, aggregate};
pub use physics::{Simulation, SimulationState};
pub use render::{DrawCommand, Highlight, RenderStyle, ViewTransform};
