use std::fmt;

use anyhow::Result;
use serde_json::Value;

use crate::model::{Annotation, AnnotationId};

/// Kind of interaction event the drawing surface emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEventKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for SurfaceEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SurfaceEventKind::Create => "create",
            SurfaceEventKind::Update => "update",
            SurfaceEventKind::Delete => "delete",
        })
    }
}

/// One interaction event from the surface.
///
/// The affected ids are carried for logging; reconciliation never consumes
/// them, since a full re-read is authoritative either way.
#[derive(Debug, Clone)]
pub struct SurfaceEvent {
    pub kind: SurfaceEventKind,
    pub ids: Vec<AnnotationId>,
}

impl SurfaceEvent {
    pub fn new(kind: SurfaceEventKind, ids: Vec<AnnotationId>) -> Self {
        Self { kind, ids }
    }
}

/// Command surface of the drawing component.
///
/// Methods take `&self`; implementations use interior mutability so one
/// handle can be shared between store and host (`Rc<dyn DrawingSurface>`).
/// Command calls never feed the event stream; events describe direct user
/// interaction only, and every command caller re-reads afterwards.
pub trait DrawingSurface {
    /// Every annotation currently on the surface, in surface order.
    fn read_all(&self) -> Result<Vec<Annotation>>;

    /// Set one property on one annotation. Geometry is untouched.
    fn set_property(&self, id: &AnnotationId, key: &str, value: Value) -> Result<()>;

    /// Remove an annotation from the surface.
    fn delete_by_id(&self, id: &AnnotationId) -> Result<()>;
}
