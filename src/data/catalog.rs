use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq)]
pub struct RelationTypeInfo {
    pub label: String,
    pub preset_strength: Option<u8>,
}

/// Human-readable labels for relation type values.
#[derive(Clone, Debug, Default)]
pub struct RelationCatalog {
    entries: HashMap<String, RelationTypeInfo>,
}

impl RelationCatalog {
    pub fn insert(&mut self, value: impl Into<String>, info: RelationTypeInfo) {
        self.entries.insert(value.into(), info);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Label for `value`, or `value` itself when the type is unknown.
    pub fn label_for<'a>(&'a self, value: &'a str) -> &'a str {
        self.entries
            .get(value)
            .map(|info| info.label.as_str())
            .unwrap_or(value)
    }

    pub fn preset_strength(&self, value: &str) -> Option<u8> {
        self.entries.get(value).and_then(|info| info.preset_strength)
    }

    /// `"80 (close)"`, or `"80 (close, preset 75)"` when the type carries a
    /// preset strength.
    pub fn describe_strength(&self, value: &str, strength: u8) -> String {
        let band = StrengthBand::from_strength(strength).label();
        match self.preset_strength(value) {
            Some(preset) => format!("{strength} ({band}, preset {preset})"),
            None => format!("{strength} ({band})"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrengthBand {
    Hostile,
    Neutral,
    Close,
}

impl StrengthBand {
    pub fn from_strength(strength: u8) -> Self {
        match strength {
            0..=30 => Self::Hostile,
            31..=70 => Self::Neutral,
            _ => Self::Close,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Hostile => "hostile",
            Self::Neutral => "neutral",
            Self::Close => "close",
        }
    }
}
