use serde::Deserialize;
use serde_json::{Number, Value};
use tracing::warn;

use crate::graph::{FactionId, MAX_STRENGTH, NEUTRAL_STRENGTH, RelationRecord, RoleRecord};

use super::catalog::{RelationCatalog, RelationTypeInfo};
use super::{DataError, Snapshot};

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(Number),
    Text(String),
}

impl RawId {
    fn into_id(self) -> Option<String> {
        let id = match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text.trim().to_owned(),
        };
        (!id.is_empty()).then_some(id)
    }
}

#[derive(Clone, Debug, Deserialize)]
struct RawRole {
    id: RawId,
    #[serde(default, alias = "display_name")]
    name: Option<String>,
    #[serde(default, alias = "faction")]
    faction_id: Option<Value>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawRelation {
    #[serde(alias = "role_id")]
    source_id: RawId,
    #[serde(alias = "related_role_id")]
    target_id: RawId,
    #[serde(default)]
    relation_type: Option<String>,
    #[serde(default, alias = "relation_strength")]
    strength: Option<Value>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawRelationType {
    value: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    preset_strength: Option<Value>,
}

/// Parses a snapshot document.
///
/// Only a non-object document is an error. Missing or `null` lists are
/// empty, and entries that do not have the expected shape are skipped.
pub fn parse_snapshot(raw: &str) -> Result<Snapshot, DataError> {
    let parsed: Value = serde_json::from_str(raw)?;
    let object = match &parsed {
        Value::Object(object) => object,
        Value::Null => return Ok(Snapshot::default()),
        Value::Array(_) => return Err(DataError::NotAnObject("an array")),
        _ => return Err(DataError::NotAnObject("a scalar")),
    };

    let roles = entries(object.get("roles"))
        .filter_map(|value| match RawRole::deserialize(value) {
            Ok(raw) => role_from_raw(raw),
            Err(error) => {
                warn!(%error, "skipping malformed role entry");
                None
            }
        })
        .collect();

    let relations = entries(object.get("relations"))
        .filter_map(|value| match RawRelation::deserialize(value) {
            Ok(raw) => relation_from_raw(raw),
            Err(error) => {
                warn!(%error, "skipping malformed relation entry");
                None
            }
        })
        .collect();

    let mut catalog = RelationCatalog::default();
    for value in entries(object.get("relation_types")) {
        match RawRelationType::deserialize(value) {
            Ok(raw) => {
                let label = raw.label.unwrap_or_else(|| raw.value.clone());
                let preset_strength = raw.preset_strength.as_ref().and_then(strength_value);
                catalog.insert(
                    raw.value,
                    RelationTypeInfo {
                        label,
                        preset_strength,
                    },
                );
            }
            Err(error) => warn!(%error, "skipping malformed relation type entry"),
        }
    }

    Ok(Snapshot {
        roles,
        relations,
        catalog,
    })
}

fn entries(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter())
        .into_iter()
        .flatten()
}

fn role_from_raw(raw: RawRole) -> Option<RoleRecord> {
    let id = raw.id.into_id()?;
    let display_name = raw.name.unwrap_or_else(|| id.clone());
    let faction_id = raw.faction_id.as_ref().and_then(faction_value);
    Some(RoleRecord {
        id,
        display_name,
        faction_id,
    })
}

fn relation_from_raw(raw: RawRelation) -> Option<RelationRecord> {
    let source_id = raw.source_id.into_id()?;
    let target_id = raw.target_id.into_id()?;
    let strength = raw
        .strength
        .as_ref()
        .and_then(strength_value)
        .unwrap_or(NEUTRAL_STRENGTH);
    Some(RelationRecord {
        source_id,
        target_id,
        relation_type: raw.relation_type.unwrap_or_default(),
        strength,
        description: raw.description,
    })
}

/// Numbers and numeric strings, clamped to `[0, 100]`.
fn strength_value(value: &Value) -> Option<u8> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number
        .is_finite()
        .then(|| number.clamp(0.0, f64::from(MAX_STRENGTH)).round() as u8)
}

fn faction_value(value: &Value) -> Option<FactionId> {
    match value {
        Value::Number(number) => number.as_u64().map(FactionId),
        Value::String(text) => text.trim().parse::<u64>().ok().map(FactionId),
        _ => None,
    }
}
