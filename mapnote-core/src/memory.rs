//! In-memory drawing surface used by tests and the terminal host.

use std::cell::RefCell;

use anyhow::{bail, Result};
use serde_json::Value;
use uuid::Uuid;

use crate::model::{Annotation, AnnotationId};
use crate::surface::{DrawingSurface, SurfaceEvent, SurfaceEventKind};

/// Callback receiving the surface's interaction events.
pub type EventListener = Box<dyn FnMut(&SurfaceEvent)>;

/// Stand-in for the real map widget: owns the feature list, mints ids, and
/// reports direct interaction (draw / drag / trash) through a single
/// attached event listener.
///
/// Command-surface calls stay silent, like a map widget that only fires
/// draw events for user interaction. The listener must not attach or detach
/// listeners from inside its callback.
#[derive(Default)]
pub struct MemorySurface {
    features: RefCell<Vec<Annotation>>,
    listener: RefCell<Option<EventListener>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the event listener. The slot holds at most one listener;
    /// attaching over an existing one is an error.
    pub fn attach_listener(&self, listener: EventListener) -> Result<()> {
        let mut slot = self.listener.borrow_mut();
        if slot.is_some() {
            bail!("surface listener already attached");
        }
        *slot = Some(listener);
        Ok(())
    }

    /// Detach the event listener, if any.
    pub fn detach_listener(&self) {
        *self.listener.borrow_mut() = None;
    }

    pub fn has_listener(&self) -> bool {
        self.listener.borrow().is_some()
    }

    /// Number of features currently on the surface.
    pub fn feature_count(&self) -> usize {
        self.features.borrow().len()
    }

    fn emit(&self, event: SurfaceEvent) {
        if let Some(listener) = self.listener.borrow_mut().as_mut() {
            listener(&event);
        }
    }

    // Interaction surface: what a user does directly on the map.

    /// User finishes drawing a polygon. The surface assigns the id.
    pub fn draw_polygon(&self, geometry: Value) -> AnnotationId {
        let id = AnnotationId::new(Uuid::new_v4().to_string());
        self.features
            .borrow_mut()
            .push(Annotation::new(id.clone(), geometry));
        self.emit(SurfaceEvent::new(SurfaceEventKind::Create, vec![id.clone()]));
        id
    }

    /// User drags an existing polygon into a new shape. Returns whether the
    /// id was present.
    pub fn drag_polygon(&self, id: &AnnotationId, geometry: Value) -> bool {
        let found = {
            let mut features = self.features.borrow_mut();
            match features.iter_mut().find(|f| f.id == *id) {
                Some(feature) => {
                    feature.geometry = geometry;
                    true
                }
                None => false,
            }
        };
        if found {
            self.emit(SurfaceEvent::new(SurfaceEventKind::Update, vec![id.clone()]));
        }
        found
    }

    /// User removes a shape with the surface's own trash control.
    pub fn trash(&self, id: &AnnotationId) -> bool {
        let removed = {
            let mut features = self.features.borrow_mut();
            let before = features.len();
            features.retain(|f| f.id != *id);
            features.len() != before
        };
        if removed {
            self.emit(SurfaceEvent::new(SurfaceEventKind::Delete, vec![id.clone()]));
        }
        removed
    }
}

impl DrawingSurface for MemorySurface {
    fn read_all(&self) -> Result<Vec<Annotation>> {
        Ok(self.features.borrow().clone())
    }

    fn set_property(&self, id: &AnnotationId, key: &str, value: Value) -> Result<()> {
        let mut features = self.features.borrow_mut();
        match features.iter_mut().find(|f| f.id == *id) {
            Some(feature) => {
                feature.properties.insert(key.to_string(), value);
                Ok(())
            }
            None => bail!("no feature with id {id}"),
        }
    }

    fn delete_by_id(&self, id: &AnnotationId) -> Result<()> {
        self.features.borrow_mut().retain(|f| f.id != *id);
        Ok(())
    }
}
