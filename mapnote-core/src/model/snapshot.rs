use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Annotation, AnnotationId};

/// Complete snapshot of every annotation on the surface, in surface order.
///
/// A set is always rebuilt whole from a full surface read, never patched in
/// place; this type has lookups only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationSet {
    pub annotations: Vec<Annotation>,
    /// When the read that produced this snapshot ran.
    pub synced_at: DateTime<Utc>,
}

impl AnnotationSet {
    pub fn new(annotations: Vec<Annotation>) -> Self {
        Self {
            annotations,
            synced_at: Utc::now(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    pub fn get(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|ann| ann.id == *id)
    }

    pub fn contains(&self, id: &AnnotationId) -> bool {
        self.get(id).is_some()
    }
}

impl Default for AnnotationSet {
    fn default() -> Self {
        Self::empty()
    }
}
