//! The annotation store: application-side mirror of the drawing surface.

use std::rc::Rc;

use log::{debug, warn};
use serde_json::Value;

use crate::editor::AnnotationCommands;
use crate::model::{AnnotationId, AnnotationSet, NAME_KEY};
use crate::surface::{DrawingSurface, SurfaceEvent};

/// Handle returned by [`AnnotationStore::subscribe`], used to unsubscribe.
pub type SubscriptionId = usize;

type SetListener = Box<dyn FnMut(&AnnotationSet)>;

/// Single source of truth for the published annotation set, and the only
/// component that writes property patches to the surface.
///
/// The store mirrors the surface by re-reading everything after each
/// mutating event instead of patching the event's diff in locally. The
/// published set can lag the surface between events, but it can never
/// diverge from it.
pub struct AnnotationStore {
    surface: Rc<dyn DrawingSurface>,
    snapshot: AnnotationSet,
    listeners: Vec<(SubscriptionId, SetListener)>,
    next_subscription: SubscriptionId,
}

impl AnnotationStore {
    /// Create a store over the given surface and take the initial snapshot.
    pub fn new(surface: Rc<dyn DrawingSurface>) -> Self {
        let mut store = Self {
            surface,
            snapshot: AnnotationSet::empty(),
            listeners: Vec::new(),
            next_subscription: 0,
        };
        store.resync();
        store
    }

    /// Most recent published snapshot. Cached; never touches the surface.
    pub fn snapshot(&self) -> &AnnotationSet {
        &self.snapshot
    }

    /// React to a surface interaction event.
    ///
    /// The event's payload is logged and otherwise ignored: whatever it
    /// described, a full re-read picks it up.
    pub fn handle_surface_event(&mut self, event: &SurfaceEvent) {
        debug!(
            "surface {} event for {} feature(s)",
            event.kind,
            event.ids.len()
        );
        self.resync();
    }

    /// Commit a new display name for `id`.
    ///
    /// The name is trimmed first; blank input is rejected without touching
    /// the surface or the snapshot. Returns whether the name was accepted.
    /// An accepted write that the surface then refuses is logged and
    /// dropped; the following re-read publishes whatever is actually true.
    pub fn rename_annotation(&mut self, id: &AnnotationId, new_name: &str) -> bool {
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            debug!("rename of {} rejected: blank name", id);
            return false;
        }

        if let Err(err) = self.surface.set_property(id, NAME_KEY, Value::from(trimmed)) {
            warn!("rename of {} dropped: {:#}", id, err);
        }
        self.resync();
        true
    }

    /// Delete `id` from the surface.
    ///
    /// Deleting an id the surface no longer has counts as already done, not
    /// as an error.
    pub fn delete_annotation(&mut self, id: &AnnotationId) {
        if let Err(err) = self.surface.delete_by_id(id) {
            debug!("delete of {} already satisfied: {:#}", id, err);
        }
        self.resync();
    }

    /// Register a listener for published sets.
    ///
    /// The listener is called immediately with the current snapshot and
    /// again after every republish, until unsubscribed.
    pub fn subscribe(&mut self, mut listener: SetListener) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        listener(&self.snapshot);
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener registered with [`subscribe`](Self::subscribe).
    pub fn unsubscribe(&mut self, subscription: SubscriptionId) {
        self.listeners.retain(|(id, _)| *id != subscription);
    }

    /// Re-read the whole surface and republish.
    ///
    /// A failed read publishes an empty set rather than propagating; the
    /// published set always reflects the surface's reachable truth.
    fn resync(&mut self) {
        let annotations = match self.surface.read_all() {
            Ok(features) => features,
            Err(err) => {
                warn!("surface read failed, publishing empty set: {:#}", err);
                Vec::new()
            }
        };
        self.snapshot = AnnotationSet::new(annotations);
        debug!("published {} annotation(s)", self.snapshot.len());
        for (_, listener) in &mut self.listeners {
            listener(&self.snapshot);
        }
    }
}

impl AnnotationCommands for AnnotationStore {
    fn rename_annotation(&mut self, id: &AnnotationId, new_name: &str) -> bool {
        AnnotationStore::rename_annotation(self, id, new_name)
    }

    fn delete_annotation(&mut self, id: &AnnotationId) {
        AnnotationStore::delete_annotation(self, id)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use anyhow::bail;
    use serde_json::json;

    use super::*;
    use crate::memory::MemorySurface;
    use crate::model::Annotation;
    use crate::surface::SurfaceEventKind;

    fn polygon(i: u64) -> serde_json::Value {
        json!({"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, i as f64], [0.0, 0.0]]]})
    }

    fn store_over(surface: &Rc<MemorySurface>) -> AnnotationStore {
        AnnotationStore::new(surface.clone() as Rc<dyn DrawingSurface>)
    }

    /// Surface wrapper whose mutations fail while reads keep working.
    struct ReadOnlySurface {
        inner: MemorySurface,
    }

    impl DrawingSurface for ReadOnlySurface {
        fn read_all(&self) -> anyhow::Result<Vec<Annotation>> {
            self.inner.read_all()
        }

        fn set_property(
            &self,
            _id: &AnnotationId,
            _key: &str,
            _value: serde_json::Value,
        ) -> anyhow::Result<()> {
            bail!("write refused")
        }

        fn delete_by_id(&self, _id: &AnnotationId) -> anyhow::Result<()> {
            bail!("delete refused")
        }
    }

    /// Surface that cannot even be read.
    struct DeadSurface;

    impl DrawingSurface for DeadSurface {
        fn read_all(&self) -> anyhow::Result<Vec<Annotation>> {
            bail!("surface gone")
        }

        fn set_property(
            &self,
            _id: &AnnotationId,
            _key: &str,
            _value: serde_json::Value,
        ) -> anyhow::Result<()> {
            bail!("surface gone")
        }

        fn delete_by_id(&self, _id: &AnnotationId) -> anyhow::Result<()> {
            bail!("surface gone")
        }
    }

    #[test]
    fn test_published_set_tracks_surface_through_event_sequence() {
        let surface = Rc::new(MemorySurface::new());
        let mut store = store_over(&surface);

        let a = surface.draw_polygon(polygon(1));
        store.handle_surface_event(&SurfaceEvent::new(SurfaceEventKind::Create, vec![a.clone()]));
        let b = surface.draw_polygon(polygon(2));
        store.handle_surface_event(&SurfaceEvent::new(SurfaceEventKind::Create, vec![b.clone()]));
        surface.drag_polygon(&a, polygon(3));
        store.handle_surface_event(&SurfaceEvent::new(SurfaceEventKind::Update, vec![a.clone()]));
        surface.trash(&b);
        store.handle_surface_event(&SurfaceEvent::new(SurfaceEventKind::Delete, vec![b]));

        // After each event the store re-read everything, so the final set
        // must equal an immediate re-read.
        let truth = surface.read_all().unwrap();
        assert_eq!(store.snapshot().annotations, truth);
        assert_eq!(store.snapshot().len(), 1);
        assert_eq!(store.snapshot().annotations[0].geometry, polygon(3));
    }

    #[test]
    fn test_back_to_back_updates_settle_on_the_last_state() {
        let surface = Rc::new(MemorySurface::new());
        let mut store = store_over(&surface);

        let id = surface.draw_polygon(polygon(1));
        store.handle_surface_event(&SurfaceEvent::new(SurfaceEventKind::Create, vec![id.clone()]));

        surface.drag_polygon(&id, polygon(7));
        store.handle_surface_event(&SurfaceEvent::new(SurfaceEventKind::Update, vec![id.clone()]));
        surface.drag_polygon(&id, polygon(8));
        store.handle_surface_event(&SurfaceEvent::new(SurfaceEventKind::Update, vec![id.clone()]));

        assert_eq!(store.snapshot().get(&id).unwrap().geometry, polygon(8));
    }

    #[test]
    fn test_rename_writes_name_and_republishes() {
        let surface = Rc::new(MemorySurface::new());
        let mut store = store_over(&surface);
        let id = surface.draw_polygon(polygon(1));
        store.handle_surface_event(&SurfaceEvent::new(SurfaceEventKind::Create, vec![id.clone()]));

        assert!(store.rename_annotation(&id, "  Lake A  "));

        let ann = store.snapshot().get(&id).unwrap();
        assert_eq!(ann.name(), Some("Lake A"));
        assert_eq!(ann.geometry, polygon(1));
    }

    #[test]
    fn test_blank_rename_is_a_complete_no_op() {
        let surface = Rc::new(MemorySurface::new());
        let mut store = store_over(&surface);
        let id = surface.draw_polygon(polygon(1));
        store.handle_surface_event(&SurfaceEvent::new(SurfaceEventKind::Create, vec![id.clone()]));
        store.rename_annotation(&id, "Lake A");

        let publishes = Rc::new(RefCell::new(0usize));
        let sink = publishes.clone();
        store.subscribe(Box::new(move |_| *sink.borrow_mut() += 1));

        assert!(!store.rename_annotation(&id, "   "));

        // Name untouched, and no republish happened for the rejected call.
        assert_eq!(store.snapshot().get(&id).unwrap().name(), Some("Lake A"));
        assert_eq!(*publishes.borrow(), 1); // the initial delivery only
    }

    #[test]
    fn test_delete_is_idempotent() {
        let surface = Rc::new(MemorySurface::new());
        let mut store = store_over(&surface);
        let id = surface.draw_polygon(polygon(1));
        store.handle_surface_event(&SurfaceEvent::new(SurfaceEventKind::Create, vec![id.clone()]));

        store.delete_annotation(&id);
        assert!(store.snapshot().is_empty());

        // Deleting again is already satisfied, not an error.
        store.delete_annotation(&id);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_subscriber_gets_current_set_then_updates() {
        let surface = Rc::new(MemorySurface::new());
        let mut store = store_over(&surface);
        let id = surface.draw_polygon(polygon(1));
        store.handle_surface_event(&SurfaceEvent::new(SurfaceEventKind::Create, vec![id.clone()]));

        let seen: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let subscription = store.subscribe(Box::new(move |set| sink.borrow_mut().push(set.len())));

        // Delivered the current snapshot on subscription.
        assert_eq!(*seen.borrow(), vec![1]);

        let other = surface.draw_polygon(polygon(2));
        store.handle_surface_event(&SurfaceEvent::new(SurfaceEventKind::Create, vec![other]));
        assert_eq!(*seen.borrow(), vec![1, 2]);

        store.unsubscribe(subscription);
        store.delete_annotation(&id);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_refused_write_still_republishes_the_truth() {
        let inner = MemorySurface::new();
        let id = inner.draw_polygon(polygon(1));
        let surface = Rc::new(ReadOnlySurface { inner });
        let mut store = AnnotationStore::new(surface.clone() as Rc<dyn DrawingSurface>);

        let publishes = Rc::new(RefCell::new(0usize));
        let sink = publishes.clone();
        store.subscribe(Box::new(move |_| *sink.borrow_mut() += 1));

        assert!(store.rename_annotation(&id, "Lake A"));

        // The write was swallowed, the re-read still ran, and the published
        // set shows the unchanged surface state.
        assert_eq!(store.snapshot().get(&id).unwrap().name(), None);
        assert_eq!(*publishes.borrow(), 2);

        store.delete_annotation(&id);
        assert!(store.snapshot().contains(&id));
        assert_eq!(*publishes.borrow(), 3);
    }

    #[test]
    fn test_unreadable_surface_publishes_empty_set() {
        let mut store = AnnotationStore::new(Rc::new(DeadSurface) as Rc<dyn DrawingSurface>);
        assert!(store.snapshot().is_empty());

        store.handle_surface_event(&SurfaceEvent::new(SurfaceEventKind::Create, vec!["x".into()]));
        assert!(store.snapshot().is_empty());
    }
}
