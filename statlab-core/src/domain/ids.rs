use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque key naming one series or comparable entity (a series ID, a country
/// code, an occupation code...). The engine never looks inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Identifier {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&Identifier> for Identifier {
    fn from(id: &Identifier) -> Self {
        id.clone()
    }
}

/// The atomic chartable unit: a whole series, or one dimension value of a
/// series (e.g. the "female" breakdown of an hours-per-day series).
///
/// Keys are structured so two columns can never collide, whatever characters
/// the identifier or dimension code contain. Turning a key into a header
/// string happens only in the view layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColumnKey {
    Plain(Identifier),
    Dimensional(Identifier, String),
}

impl ColumnKey {
    pub fn plain(id: impl Into<Identifier>) -> Self {
        Self::Plain(id.into())
    }

    pub fn dimensional(id: impl Into<Identifier>, code: impl Into<String>) -> Self {
        Self::Dimensional(id.into(), code.into())
    }

    /// The series this column belongs to.
    pub fn identifier(&self) -> &Identifier {
        match self {
            Self::Plain(id) | Self::Dimensional(id, _) => id,
        }
    }

    /// Dimension-value code, for dimensional columns.
    pub fn dimension(&self) -> Option<&str> {
        match self {
            Self::Plain(_) => None,
            Self::Dimensional(_, code) => Some(code),
        }
    }
}
