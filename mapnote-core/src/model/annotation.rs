use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Property key holding an annotation's display name.
pub const NAME_KEY: &str = "name";

/// Placeholder shown for annotations without a usable name.
pub const UNNAMED: &str = "No Name";

/// Identifier assigned by the drawing surface when a shape is drawn.
///
/// Opaque to the application: never parsed, never minted here, only carried
/// back into surface commands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(String);

impl AnnotationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for list rows ("Shape 4f3a2e10").
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AnnotationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AnnotationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One user-drawn shape plus its properties, as reported by the surface.
///
/// The geometry belongs to the surface; it is carried around and serialized
/// but never constructed or mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub geometry: Value,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Annotation {
    pub fn new(id: AnnotationId, geometry: Value) -> Self {
        Self {
            id,
            geometry,
            properties: Map::new(),
        }
    }

    /// Committed display name, if one has been set.
    ///
    /// A `name` property that is absent, non-string, empty, or
    /// whitespace-only all count as unnamed.
    pub fn name(&self) -> Option<&str> {
        self.properties
            .get(NAME_KEY)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Name to render: the committed name or the unnamed placeholder.
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or(UNNAMED)
    }
}
