//! Per-annotation name editing.

use crate::model::{Annotation, AnnotationId, AnnotationSet, UNNAMED};

/// Commands an editor may issue on behalf of its annotation.
///
/// Implemented by [`AnnotationStore`](crate::store::AnnotationStore); tests
/// substitute a recording fake. Editors have no other coupling to the store
/// and never touch the surface themselves.
pub trait AnnotationCommands {
    /// Returns whether the name was accepted (non-blank after trimming).
    fn rename_annotation(&mut self, id: &AnnotationId, new_name: &str) -> bool;

    fn delete_annotation(&mut self, id: &AnnotationId);
}

/// Display-name lifecycle of one annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditState {
    Viewing,
    Editing { draft: String },
}

/// Name editor for a single annotation.
///
/// `committed` mirrors the annotation's `name` property as of the last
/// published set. The draft exists only while editing and is dropped on any
/// exit from editing that is not a commit.
#[derive(Debug, Clone)]
pub struct NameEditor {
    id: AnnotationId,
    committed: Option<String>,
    state: EditState,
}

impl NameEditor {
    /// Editor for an annotation as it appears in the published set.
    pub fn new(annotation: &Annotation) -> Self {
        Self {
            id: annotation.id.clone(),
            committed: annotation.name().map(str::to_string),
            state: EditState::Viewing,
        }
    }

    pub fn id(&self) -> &AnnotationId {
        &self.id
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing { .. })
    }

    /// Committed name, or `None` while the annotation is unnamed.
    pub fn committed(&self) -> Option<&str> {
        self.committed.as_deref()
    }

    /// What a viewing row shows: the committed name or the placeholder.
    pub fn display_name(&self) -> &str {
        self.committed.as_deref().unwrap_or(UNNAMED)
    }

    /// Current draft, while editing.
    pub fn draft(&self) -> Option<&str> {
        match &self.state {
            EditState::Editing { draft } => Some(draft),
            EditState::Viewing => None,
        }
    }

    /// Start editing. The draft starts from the committed name.
    pub fn begin_edit(&mut self) {
        if self.state == EditState::Viewing {
            self.state = EditState::Editing {
                draft: self.committed.clone().unwrap_or_default(),
            };
        }
    }

    /// Append one character to the draft.
    pub fn input_char(&mut self, c: char) {
        if let EditState::Editing { draft } = &mut self.state {
            draft.push(c);
        }
    }

    /// Remove the last character of the draft.
    pub fn backspace(&mut self) {
        if let EditState::Editing { draft } = &mut self.state {
            draft.pop();
        }
    }

    /// Replace the whole draft, for hosts with their own line editing.
    pub fn set_draft(&mut self, text: &str) {
        if let EditState::Editing { draft } = &mut self.state {
            *draft = text.to_string();
        }
    }

    /// Leave editing without committing. The draft is dropped.
    pub fn cancel_edit(&mut self) {
        if self.is_editing() {
            self.state = EditState::Viewing;
        }
    }

    /// Commit the draft as the new name.
    ///
    /// A blank draft is rejected: the editor stays in editing and no
    /// command is issued. The explicit confirm action and the submit
    /// keystroke both land here. Returns whether the commit went through.
    pub fn commit(&mut self, commands: &mut dyn AnnotationCommands) -> bool {
        let EditState::Editing { draft } = &self.state else {
            return false;
        };
        let trimmed = draft.trim();
        if trimmed.is_empty() {
            return false;
        }

        let trimmed = trimmed.to_string();
        commands.rename_annotation(&self.id, &trimmed);
        self.committed = Some(trimmed);
        self.state = EditState::Viewing;
        true
    }

    /// Ask for this annotation's deletion, from either mode.
    ///
    /// The editor itself is torn down once the id drops out of the next
    /// published set; see [`EditorPanel::sync_with`].
    pub fn delete(&self, commands: &mut dyn AnnotationCommands) {
        commands.delete_annotation(&self.id);
    }

    /// Refresh the committed name from a republished annotation. An open
    /// draft is left alone.
    pub fn refresh(&mut self, annotation: &Annotation) {
        self.committed = annotation.name().map(str::to_string);
    }
}

/// One editor per published annotation, keyed by id, in publish order.
#[derive(Debug, Default)]
pub struct EditorPanel {
    editors: Vec<NameEditor>,
}

impl EditorPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile the editor list against a newly published set.
    ///
    /// New ids get fresh editors, surviving ids keep theirs (committed name
    /// refreshed, drafts preserved), and editors whose annotation vanished
    /// are dropped together with any in-progress draft.
    pub fn sync_with(&mut self, set: &AnnotationSet) {
        let mut editors = Vec::with_capacity(set.len());
        for annotation in set.iter() {
            match self.take_editor(&annotation.id) {
                Some(mut editor) => {
                    editor.refresh(annotation);
                    editors.push(editor);
                }
                None => editors.push(NameEditor::new(annotation)),
            }
        }
        self.editors = editors;
    }

    fn take_editor(&mut self, id: &AnnotationId) -> Option<NameEditor> {
        let index = self.editors.iter().position(|editor| editor.id() == id)?;
        Some(self.editors.remove(index))
    }

    pub fn len(&self) -> usize {
        self.editors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.editors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NameEditor> {
        self.editors.iter()
    }

    pub fn get(&self, index: usize) -> Option<&NameEditor> {
        self.editors.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut NameEditor> {
        self.editors.get_mut(index)
    }

    pub fn editor_for(&self, id: &AnnotationId) -> Option<&NameEditor> {
        self.editors.iter().find(|editor| editor.id() == id)
    }

    pub fn editor_for_mut(&mut self, id: &AnnotationId) -> Option<&mut NameEditor> {
        self.editors.iter_mut().find(|editor| editor.id() == id)
    }
}
