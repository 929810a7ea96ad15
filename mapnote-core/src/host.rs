//! Ownership and wiring of the one drawing-surface instance.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{bail, Result};

use crate::memory::MemorySurface;
use crate::store::AnnotationStore;

/// Owns the single drawing-surface instance and the event wiring that feeds
/// the store.
///
/// The surface may only exist once per host lifetime: [`init`](Self::init)
/// constructs it, builds the store over it, and attaches the forwarding
/// listener; a second call errors instead of minting a second surface, even
/// after [`teardown`](Self::teardown). Teardown detaches the listener so no
/// callback keeps firing into a store after the hosting container is gone.
#[derive(Default)]
pub struct SurfaceHost {
    mounted: Option<Mounted>,
    ever_initialized: bool,
}

struct Mounted {
    surface: Rc<MemorySurface>,
    store: Rc<RefCell<AnnotationStore>>,
}

impl SurfaceHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct the surface, the store over it, and the event wiring.
    pub fn init(&mut self) -> Result<()> {
        if self.ever_initialized {
            bail!("drawing surface already initialized");
        }
        self.ever_initialized = true;

        let surface = Rc::new(MemorySurface::new());
        let store = Rc::new(RefCell::new(AnnotationStore::new(surface.clone())));

        let sink = store.clone();
        surface.attach_listener(Box::new(move |event| {
            sink.borrow_mut().handle_surface_event(event);
        }))?;

        self.mounted = Some(Mounted { surface, store });
        Ok(())
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Shared handle to the surface, while mounted.
    pub fn surface(&self) -> Option<Rc<MemorySurface>> {
        self.mounted.as_ref().map(|m| m.surface.clone())
    }

    /// Shared handle to the store, while mounted.
    pub fn store(&self) -> Option<Rc<RefCell<AnnotationStore>>> {
        self.mounted.as_ref().map(|m| m.store.clone())
    }

    /// Detach the event listener and release the host's handles.
    ///
    /// Handles cloned out earlier stay valid; they just stop receiving
    /// surface events.
    pub fn teardown(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            mounted.surface.detach_listener();
        }
    }
}

impl Drop for SurfaceHost {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn polygon() -> serde_json::Value {
        json!({"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]]]})
    }

    #[test]
    fn test_events_flow_into_the_store() {
        let mut host = SurfaceHost::new();
        host.init().unwrap();
        let surface = host.surface().unwrap();
        let store = host.store().unwrap();

        let id = surface.draw_polygon(polygon());
        assert!(store.borrow().snapshot().contains(&id));

        surface.trash(&id);
        assert!(store.borrow().snapshot().is_empty());
    }

    #[test]
    fn test_second_init_is_refused() {
        let mut host = SurfaceHost::new();
        host.init().unwrap();
        assert!(host.init().is_err());

        // Still refused after teardown; the surface lives once per host.
        host.teardown();
        assert!(host.init().is_err());
        assert!(!host.is_mounted());
    }

    #[test]
    fn test_teardown_detaches_the_wiring() {
        let mut host = SurfaceHost::new();
        host.init().unwrap();
        let surface = host.surface().unwrap();
        let store = host.store().unwrap();

        surface.draw_polygon(polygon());
        assert_eq!(store.borrow().snapshot().len(), 1);

        host.teardown();
        assert!(!surface.has_listener());

        // Interaction after teardown no longer reaches the store.
        surface.draw_polygon(polygon());
        assert_eq!(store.borrow().snapshot().len(), 1);
        assert_eq!(surface.feature_count(), 2);
    }

    #[test]
    fn test_dropping_the_host_detaches_too() {
        let mut host = SurfaceHost::new();
        host.init().unwrap();
        let surface = host.surface().unwrap();

        drop(host);
        assert!(!surface.has_listener());
    }
}
