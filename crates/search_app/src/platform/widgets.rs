use search_core::{BlobRef, GridEvent, ToolbarEvent};

use super::events::EventSource;

/// Thumbnail edge lengths the grid steps through when zooming.
pub const THUMBNAIL_SIZES: [u32; 8] = [25, 50, 75, 100, 150, 200, 250, 300];
const DEFAULT_SIZE_INDEX: usize = 3;

#[derive(Default)]
pub struct Toolbar {
    pub events: EventSource<ToolbarEvent>,
    checked_count: usize,
}

impl Toolbar {
    pub fn click(&self, event: ToolbarEvent) {
        self.events.emit(&event);
    }

    pub fn set_checked_count(&mut self, count: usize) {
        self.checked_count = count;
    }

    pub fn checked_count(&self) -> usize {
        self.checked_count
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Changed(String),
    Submitted,
}

/// Search text box plus submit button.
pub struct SearchForm {
    pub events: EventSource<FormEvent>,
    text: String,
    enabled: bool,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self {
            events: EventSource::new(),
            text: String::new(),
            enabled: true,
        }
    }
}

impl SearchForm {
    pub fn type_text(&mut self, text: &str) {
        if !self.enabled {
            return;
        }
        self.text = text.to_string();
        self.events.emit(&FormEvent::Changed(self.text.clone()));
    }

    /// Submitting a disabled form does nothing.
    pub fn submit(&self) {
        if self.enabled {
            self.events.emit(&FormEvent::Submitted);
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Grid of permanode results with per-item check boxes.
pub struct BlobItemGrid {
    pub events: EventSource<GridEvent>,
    items: Vec<BlobRef>,
    checked: Vec<bool>,
    size_index: usize,
}

impl Default for BlobItemGrid {
    fn default() -> Self {
        Self {
            events: EventSource::new(),
            items: Vec::new(),
            checked: Vec::new(),
            size_index: DEFAULT_SIZE_INDEX,
        }
    }
}

impl BlobItemGrid {
    /// Replaces the items; all checks are dropped.
    pub fn populate(&mut self, items: Vec<BlobRef>) {
        let had_checks = self.checked.iter().any(|checked| *checked);
        self.checked = vec![false; items.len()];
        self.items = items;
        if had_checks {
            self.events.emit(&GridEvent::ItemsChosen(Vec::new()));
        }
    }

    /// Flips the check box of the item at `index`; out-of-range is ignored.
    pub fn toggle(&mut self, index: usize) {
        let Some(checked) = self.checked.get_mut(index) else {
            return;
        };
        *checked = !*checked;
        self.events
            .emit(&GridEvent::ItemsChosen(self.checked_items()));
    }

    pub fn checked_items(&self) -> Vec<BlobRef> {
        self.items
            .iter()
            .zip(&self.checked)
            .filter(|(_, checked)| **checked)
            .map(|(item, _)| item.clone())
            .collect()
    }

    pub fn is_checked(&self, index: usize) -> bool {
        self.checked.get(index).copied().unwrap_or(false)
    }

    pub fn unselect_all(&mut self) {
        self.checked.iter_mut().for_each(|checked| *checked = false);
    }

    pub fn bigger(&mut self) {
        if self.size_index + 1 < THUMBNAIL_SIZES.len() {
            self.size_index += 1;
        }
    }

    pub fn smaller(&mut self) {
        self.size_index = self.size_index.saturating_sub(1);
    }

    pub fn thumbnail_size(&self) -> u32 {
        THUMBNAIL_SIZES[self.size_index]
    }

    pub fn items(&self) -> &[BlobRef] {
        &self.items
    }
}

/// Every widget on the page, handed to the effect runner as one unit.
#[derive(Default)]
pub struct Widgets {
    pub toolbar: Toolbar,
    pub form: SearchForm,
    pub grid: BlobItemGrid,
    /// Last location the page asked to navigate to.
    pub navigation: Option<String>,
}
