//! Editor actions: keyword-driven mutations of the host document.
//!
//! The host editor is reached through the [`EditorSurface`] capability
//! trait; [`TextBuffer`] is the in-crate implementation used by tests and
//! by embedders without a richer editor.

// ---------------------------------------------------------------------------
// Capability trait + actions
// ---------------------------------------------------------------------------

/// What the plugin needs from the host editor.
pub trait EditorSurface {
    /// The currently selected text, empty when nothing is selected.
    fn selection(&self) -> String;
    /// Replace the selected range with `text` (insert at cursor when the
    /// selection is empty).
    fn replace_selection(&mut self, text: &str);
    /// Insert `text` at the cursor, leaving the selection untouched.
    fn insert_at_cursor(&mut self, text: &str);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorAction {
    Highlight,
    Replace,
    Insert,
}

/// Marker pair wrapped around a highlighted selection.
pub const HIGHLIGHT_MARKER: &str = "==";

/// Detect the action keyword in the user's command text.
///
/// Case-insensitive substring checks, first match in priority order
/// highlight → replace → insert wins. `None` means the completion is
/// recorded in the transcript but the document is left alone.
pub fn detect_action(command: &str) -> Option<EditorAction> {
    let lower = command.to_lowercase();
    if lower.contains("highlight") {
        Some(EditorAction::Highlight)
    } else if lower.contains("replace") {
        Some(EditorAction::Replace)
    } else if lower.contains("insert") {
        Some(EditorAction::Insert)
    } else {
        None
    }
}

/// Apply `action` to the editor. Highlight ignores the completion content
/// entirely; replace and insert use it verbatim.
pub fn apply_action(action: EditorAction, editor: &mut dyn EditorSurface, completion: &str) {
    match action {
        EditorAction::Highlight => {
            let selected = editor.selection();
            editor.replace_selection(&format!("{HIGHLIGHT_MARKER}{selected}{HIGHLIGHT_MARKER}"));
        }
        EditorAction::Replace => editor.replace_selection(completion),
        EditorAction::Insert => editor.insert_at_cursor(completion),
    }
}

// ---------------------------------------------------------------------------
// TextBuffer — plain-text EditorSurface
// ---------------------------------------------------------------------------

/// A document with a selection range and a cursor at the selection's end.
/// Offsets are byte indices and must sit on char boundaries.
#[derive(Clone, Debug, Default)]
pub struct TextBuffer {
    content: String,
    sel_start: usize,
    sel_end: usize,
}

impl TextBuffer {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            sel_start: 0,
            sel_end: 0,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn cursor(&self) -> usize {
        self.sel_end
    }

    /// Select `[start, end)`. Out-of-bounds or inverted ranges are clamped;
    /// offsets off a char boundary are snapped back to the previous one.
    pub fn select(&mut self, start: usize, end: usize) {
        let start = snap(&self.content, start.min(self.content.len()));
        let end = snap(&self.content, end.min(self.content.len()));
        self.sel_start = start.min(end);
        self.sel_end = start.max(end);
    }

    /// Select the first occurrence of `needle`, if present.
    pub fn select_first(&mut self, needle: &str) -> bool {
        match self.content.find(needle) {
            Some(pos) => {
                self.sel_start = pos;
                self.sel_end = pos + needle.len();
                true
            }
            None => false,
        }
    }

    /// Collapse the selection and place the cursor at `pos`.
    pub fn set_cursor(&mut self, pos: usize) {
        let pos = snap(&self.content, pos.min(self.content.len()));
        self.sel_start = pos;
        self.sel_end = pos;
    }
}

fn snap(s: &str, mut pos: usize) -> usize {
    while pos > 0 && !s.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

impl EditorSurface for TextBuffer {
    fn selection(&self) -> String {
        self.content[self.sel_start..self.sel_end].to_string()
    }

    fn replace_selection(&mut self, text: &str) {
        self.content.replace_range(self.sel_start..self.sel_end, text);
        // Cursor lands after the inserted text, selection collapsed
        self.sel_start += text.len();
        self.sel_end = self.sel_start;
    }

    fn insert_at_cursor(&mut self, text: &str) {
        self.content.insert_str(self.sel_end, text);
        // Selection untouched: the selected range sits before the insertion
        // point, so its offsets stay valid.
    }
}
