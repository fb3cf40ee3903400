mod aggregate;
mod records;

pub use aggregate::{AggregateStats, Edge, Node, PairKey, RoleGraph, aggregate};
pub use records::{FactionId, MAX_STRENGTH, NEUTRAL_STRENGTH, RelationRecord, RoleRecord};
