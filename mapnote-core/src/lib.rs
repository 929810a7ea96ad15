//! mapnote core - annotation bookkeeping for a polygon drawing surface
//!
//! This crate keeps an application-level view of named polygon annotations
//! consistent with a drawing surface that owns the actual geometry editing.
//! The store re-reads the whole surface after every mutating event and
//! republishes a complete snapshot; per-annotation name editors manage the
//! view/edit lifecycle on top of it; the host wires the one surface
//! instance to the store.

pub mod editor;
pub mod host;
pub mod memory;
pub mod model;
pub mod store;
pub mod surface;

pub use editor::{AnnotationCommands, EditState, EditorPanel, NameEditor};
pub use host::SurfaceHost;
pub use memory::MemorySurface;
pub use model::{Annotation, AnnotationId, AnnotationSet, NAME_KEY, UNNAMED};
pub use store::{AnnotationStore, SubscriptionId};
pub use surface::{DrawingSurface, SurfaceEvent, SurfaceEventKind};
