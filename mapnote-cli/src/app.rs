//! Application state for the terminal host.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use mapnote_core::{
    AnnotationId, AnnotationSet, AnnotationStore, EditorPanel, MemorySurface, SurfaceHost,
};

use crate::io::SeedFeature;

/// Input mode for key dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    EditName,
    Help,
}

/// Terminal-host application state.
///
/// Owns the surface host and plays the part of the interactive map: drawing
/// and reshaping go through the surface's interaction methods (and reach
/// the store via events), renames and deletes go through the editors.
pub struct App {
    host: SurfaceHost,
    surface: Rc<MemorySurface>,
    store: Rc<RefCell<AnnotationStore>>,
    /// Latest published set, maintained by the store subscription.
    published: Rc<RefCell<AnnotationSet>>,
    pub panel: EditorPanel,
    pub mode: Mode,
    pub selected: usize,
    pub status_message: Option<String>,
    pub running: bool,
    /// How many demo shapes were placed, to stagger their positions.
    drawn: usize,
}

impl App {
    pub fn new() -> Result<Self> {
        let mut host = SurfaceHost::new();
        host.init()?;
        let surface = host.surface().context("surface host did not mount")?;
        let store = host.store().context("surface host did not mount")?;

        let published = Rc::new(RefCell::new(AnnotationSet::empty()));
        let sink = published.clone();
        store
            .borrow_mut()
            .subscribe(Box::new(move |set| *sink.borrow_mut() = set.clone()));

        Ok(Self {
            host,
            surface,
            store,
            published,
            panel: EditorPanel::new(),
            mode: Mode::Browse,
            selected: 0,
            status_message: None,
            running: true,
            drawn: 0,
        })
    }

    /// Latest published set.
    pub fn published(&self) -> Ref<'_, AnnotationSet> {
        self.published.borrow()
    }

    /// Bring editors and selection in line with the latest published set.
    pub fn sync(&mut self) {
        let was_editing = self.mode == Mode::EditName;
        {
            let set = self.published.borrow();
            self.panel.sync_with(&set);
        }

        if was_editing {
            // Follow the editor that is still open, wherever the republish
            // moved it; if its annotation vanished, the draft went with it.
            let editing_index = self.panel.iter().position(|editor| editor.is_editing());
            match editing_index {
                Some(index) => self.selected = index,
                None => {
                    self.mode = Mode::Browse;
                    self.set_status("Shape was deleted; name edit discarded");
                }
            }
        }

        if self.panel.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.panel.len() {
            self.selected = self.panel.len() - 1;
        }
    }

    fn selected_id(&self) -> Option<AnnotationId> {
        self.panel.get(self.selected).map(|editor| editor.id().clone())
    }

    // Surface interaction: what clicking around on the map would do.

    /// Draw a fresh demo polygon on the surface.
    pub fn draw_shape(&mut self) {
        let geometry = demo_polygon(self.drawn);
        self.drawn += 1;
        let id = self.surface.draw_polygon(geometry);
        self.sync();
        if let Some(index) = self.panel.iter().position(|editor| editor.id() == &id) {
            self.selected = index;
        }
        self.set_status(&format!("Drew shape {}", id.short()));
    }

    /// Drag the selected polygon into a new outline.
    pub fn reshape_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        let geometry = demo_polygon(self.drawn);
        self.drawn += 1;
        self.surface.drag_polygon(&id, geometry);
        self.sync();
        self.set_status(&format!("Reshaped shape {}", id.short()));
    }

    /// Remove the selected shape with the surface's own trash control.
    pub fn trash_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        self.surface.trash(&id);
        self.sync();
        self.set_status(&format!("Trashed shape {}", id.short()));
    }

    // Annotation commands, routed through the selected editor.

    /// Delete the selected annotation via its editor.
    pub fn delete_selected(&mut self) {
        let Some(editor) = self.panel.get(self.selected) else { return };
        let id = editor.id().clone();
        {
            let mut store = self.store.borrow_mut();
            editor.delete(&mut *store);
        }
        self.sync();
        self.set_status(&format!("Deleted shape {}", id.short()));
    }

    pub fn begin_edit(&mut self) {
        if let Some(editor) = self.panel.get_mut(self.selected) {
            editor.begin_edit();
            self.mode = Mode::EditName;
        }
    }

    pub fn input_char(&mut self, c: char) {
        if let Some(editor) = self.panel.get_mut(self.selected) {
            editor.input_char(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(editor) = self.panel.get_mut(self.selected) {
            editor.backspace();
        }
    }

    pub fn commit_edit(&mut self) {
        let outcome = {
            let Some(editor) = self.panel.get_mut(self.selected) else { return };
            let mut store = self.store.borrow_mut();
            if editor.commit(&mut *store) {
                Some(editor.display_name().to_string())
            } else {
                None
            }
        };

        match outcome {
            Some(name) => {
                self.mode = Mode::Browse;
                self.sync();
                self.set_status(&format!("Renamed to \"{}\"", name));
            }
            None => self.set_status("Name cannot be empty"),
        }
    }

    pub fn cancel_edit(&mut self) {
        if let Some(editor) = self.panel.get_mut(self.selected) {
            editor.cancel_edit();
        }
        self.mode = Mode::Browse;
        self.set_status("Edit cancelled");
    }

    // Navigation

    pub fn select_next(&mut self) {
        let count = self.panel.len();
        if count > 0 {
            self.selected = (self.selected + 1) % count;
        }
    }

    pub fn select_prev(&mut self) {
        let count = self.panel.len();
        if count > 0 {
            self.selected = if self.selected == 0 {
                count - 1
            } else {
                self.selected - 1
            };
        }
    }

    /// Place seed features on the surface as if the user had drawn them.
    pub fn seed(&mut self, features: Vec<SeedFeature>) -> usize {
        let count = features.len();
        for feature in features {
            let id = self.surface.draw_polygon(feature.geometry);
            if let Some(name) = feature.name {
                self.store.borrow_mut().rename_annotation(&id, &name);
            }
        }
        self.sync();
        count
    }

    /// Set status message
    pub fn set_status(&mut self, msg: &str) {
        self.status_message = Some(msg.to_string());
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Detach the surface wiring on the way out.
    pub fn shutdown(&mut self) {
        self.host.teardown();
    }
}

/// Where the demo map starts out; a mid-continent view.
const BASE_CENTER: (f64, f64) = (-91.874, 42.76);

/// Pentagon at a position staggered by how many shapes came before it.
fn demo_polygon(index: usize) -> Value {
    let col = (index % 5) as f64;
    let row = (index / 5) as f64;
    let (cx, cy) = (BASE_CENTER.0 + 0.4 * col, BASE_CENTER.1 + 0.3 * row);

    let mut ring: Vec<Value> = (0..5)
        .map(|k| {
            let angle = k as f64 * std::f64::consts::TAU / 5.0;
            json!([cx + 0.15 * angle.cos(), cy + 0.15 * angle.sin()])
        })
        .collect();
    ring.push(ring[0].clone());

    json!({"type": "Polygon", "coordinates": [ring]})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_rename_trash_round_trip() {
        let mut app = App::new().unwrap();
        assert!(app.published().is_empty());

        app.draw_shape();
        assert_eq!(app.published().len(), 1);
        assert_eq!(app.panel.len(), 1);

        app.begin_edit();
        for c in "North Field".chars() {
            app.input_char(c);
        }
        app.commit_edit();
        assert_eq!(app.mode, Mode::Browse);
        assert_eq!(
            app.published().annotations[0].name(),
            Some("North Field")
        );

        app.trash_selected();
        assert!(app.published().is_empty());
        assert!(app.panel.is_empty());
    }

    #[test]
    fn test_blank_commit_keeps_editing() {
        let mut app = App::new().unwrap();
        app.draw_shape();
        app.begin_edit();
        app.input_char(' ');
        app.commit_edit();

        assert_eq!(app.mode, Mode::EditName);
        assert_eq!(app.published().annotations[0].name(), None);
    }

    #[test]
    fn test_trash_while_editing_discards_the_draft() {
        let mut app = App::new().unwrap();
        app.draw_shape();
        app.draw_shape();
        app.begin_edit();
        app.input_char('x');

        // The surface removes the shape out from under the editor.
        let id = app.panel.get(app.selected).unwrap().id().clone();
        app.surface.trash(&id);
        app.sync();

        assert_eq!(app.mode, Mode::Browse);
        assert_eq!(app.panel.len(), 1);
        assert!(app.panel.iter().all(|editor| !editor.is_editing()));
    }

    #[test]
    fn test_demo_polygons_are_closed_rings() {
        let polygon = demo_polygon(3);
        let ring = polygon["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 6);
        assert_eq!(ring.first(), ring.last());
    }
}
