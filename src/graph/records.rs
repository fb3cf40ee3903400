use std::fmt;

/// Strength assumed for a relation side that has no record.
pub const NEUTRAL_STRENGTH: u8 = 35;

pub const MAX_STRENGTH: u8 = 100;

/// Grouping id of a role. Only used for coloring and the affinity force.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactionId(pub u64);

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoleRecord {
    pub id: String,
    pub display_name: String,
    pub faction_id: Option<FactionId>,
}

impl RoleRecord {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            faction_id: None,
        }
    }

    pub fn with_faction(mut self, faction: u64) -> Self {
        self.faction_id = Some(FactionId(faction));
        self
    }
}

/// One directional, typed, weighted relation between two role ids.
#[derive(Clone, Debug, PartialEq)]
pub struct RelationRecord {
    pub source_id: String,
    pub target_id: String,
    pub relation_type: String,
    pub strength: u8,
    pub description: Option<String>,
}

impl RelationRecord {
    /// Strength is clamped to `[0, 100]`.
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        relation_type: impl Into<String>,
        strength: u8,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            relation_type: relation_type.into(),
            strength: strength.min(MAX_STRENGTH),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
