use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::provider::ProviderError;
use crate::tree::model::ObjectTree;

/// Construction-time view behavior.
///
/// `interactive` is an explicit per-view value (not process-wide state):
/// when false the view still navigates and selects but ignores structural
/// input, so a read-only inspector cannot be mutated from the keyboard or
/// mouse.
#[derive(Debug, Clone, Copy)]
pub struct ViewOptions {
    pub interactive: bool,
    /// Indentation cells per depth level.
    pub indent_unit: u16,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            interactive: true,
            indent_unit: 2,
        }
    }
}

/// Selection and viewport state for one rendered tree.
///
/// Owns what the model must not: the selected row index, the first-visible
/// row index, and the shaded block. All of it is positional and therefore
/// dies on a rebuild; the session round-trips it through row keys instead.
pub struct TreeView {
    selected: Option<usize>,
    scroll: usize,
    viewport_height: usize,
    block: Option<(usize, usize)>,
    damage: Option<(usize, usize)>,
    options: ViewOptions,
}

impl TreeView {
    pub fn new(options: ViewOptions) -> Self {
        Self {
            selected: None,
            scroll: 0,
            viewport_height: 0,
            block: None,
            damage: None,
            options,
        }
    }

    pub fn options(&self) -> ViewOptions {
        self.options
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    /// Record the number of rows the surface can show; the renderer calls
    /// this every frame since the terminal can resize at any time.
    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height;
    }

    /// Reset positional state after the model was (re)initialized.
    pub fn reset(&mut self, model: &ObjectTree) {
        self.scroll = 0;
        self.selected = if model.is_empty() { None } else { Some(0) };
        self.refresh_block(model);
    }

    /// The currently shaded block of rows, inclusive on both ends.
    pub fn shaded_block(&self) -> Option<(usize, usize)> {
        self.block
    }

    /// The span of rows whose shading changed since the last call: the
    /// union of the previous and current block. Redraw cost tracks block
    /// size, not row count.
    pub fn take_damage(&mut self) -> Option<(usize, usize)> {
        self.damage.take()
    }

    pub fn select(&mut self, index: Option<usize>, model: &ObjectTree) {
        self.selected = match index {
            Some(i) if !model.is_empty() => Some(i.min(model.len() - 1)),
            _ => None,
        };
        self.refresh_block(model);
    }

    pub fn select_prev(&mut self, model: &ObjectTree) {
        let target = self.selected.map(|i| i.saturating_sub(1)).unwrap_or(0);
        self.select(Some(target), model);
    }

    pub fn select_next(&mut self, model: &ObjectTree) {
        let target = self.selected.map(|i| i + 1).unwrap_or(0);
        self.select(Some(target), model);
    }

    pub fn select_page_up(&mut self, model: &ObjectTree) {
        let page = self.viewport_height.max(1);
        let target = self.selected.map(|i| i.saturating_sub(page)).unwrap_or(0);
        self.select(Some(target), model);
    }

    pub fn select_page_down(&mut self, model: &ObjectTree) {
        let page = self.viewport_height.max(1);
        let target = self.selected.map(|i| i + page).unwrap_or(0);
        self.select(Some(target), model);
    }

    pub fn select_first(&mut self, model: &ObjectTree) {
        self.select(Some(0), model);
    }

    pub fn select_last(&mut self, model: &ObjectTree) {
        if !model.is_empty() {
            self.select(Some(model.len() - 1), model);
        }
    }

    /// Select the logical parent of the current row, if it has one.
    pub fn select_parent(&mut self, model: &ObjectTree) {
        if let Some(parent) = self.selected.and_then(|i| model.parent_index(i)) {
            self.select(Some(parent), model);
        }
    }

    /// Bring the selected row into the viewport, moving the scroll as
    /// little as possible.
    pub fn update_scroll_for_selection(&mut self) {
        let Some(selected) = self.selected else {
            return;
        };
        let height = self.viewport_height.max(1);
        if selected < self.scroll {
            self.scroll = selected;
        } else if selected >= self.scroll + height {
            self.scroll = selected + 1 - height;
        }
    }

    /// Toggle the selected row. Returns whether the row sequence changed.
    pub fn toggle_selected(&mut self, model: &mut ObjectTree) -> Result<bool, ProviderError> {
        if !self.options.interactive {
            return Ok(false);
        }
        let Some(index) = self.selected else {
            return Ok(false);
        };
        let old_len = model.len();
        let changed = model.toggle(index)?;
        if changed {
            self.structure_changed(index, old_len, model);
        }
        Ok(changed)
    }

    /// Left-arrow behavior: collapse an expanded row, otherwise move to the
    /// parent row.
    pub fn collapse_or_ascend(&mut self, model: &mut ObjectTree) -> Result<bool, ProviderError> {
        let Some(index) = self.selected else {
            return Ok(false);
        };
        if self.options.interactive && model.is_expanded(index) {
            let old_len = model.len();
            model.collapse(index);
            self.structure_changed(index, old_len, model);
            return Ok(true);
        }
        self.select_parent(model);
        Ok(true)
    }

    /// Right-arrow behavior: expand a collapsed row with children.
    pub fn expand_selected(&mut self, model: &mut ObjectTree) -> Result<bool, ProviderError> {
        if !self.options.interactive {
            return Ok(false);
        }
        let Some(index) = self.selected else {
            return Ok(false);
        };
        if model.node(index).has_children && !model.is_expanded(index) {
            let old_len = model.len();
            let changed = model.expand(index)?;
            if changed {
                self.structure_changed(index, old_len, model);
            }
            return Ok(changed);
        }
        Ok(false)
    }

    /// Keep selection and viewport on the same logical rows after a toggle
    /// at `toggled` changed the sequence: positions past the splice shift by
    /// the inserted/removed count, positions inside a removed block land on
    /// the collapsed row itself.
    pub fn structure_changed(&mut self, toggled: usize, old_len: usize, model: &ObjectTree) {
        let new_len = model.len();
        let remap = |index: usize| -> usize {
            if new_len >= old_len {
                let added = new_len - old_len;
                if index > toggled {
                    index + added
                } else {
                    index
                }
            } else {
                let removed = old_len - new_len;
                if index > toggled + removed {
                    index - removed
                } else if index > toggled {
                    toggled
                } else {
                    index
                }
            }
        };
        self.selected = self.selected.map(remap);
        self.scroll = remap(self.scroll);
        self.after_structure_change(model);
    }

    /// Re-clamp positional state after the row sequence changed under the
    /// view: keep the first-visible row where possible, re-select the same
    /// row index clamped to the new count.
    pub fn after_structure_change(&mut self, model: &ObjectTree) {
        let max_scroll = self.max_scroll(model);
        self.scroll = self.scroll.min(max_scroll);
        self.selected = match self.selected {
            Some(i) if !model.is_empty() => Some(i.min(model.len() - 1)),
            _ if !model.is_empty() => Some(0),
            _ => None,
        };
        self.refresh_block(model);
    }

    /// Re-anchor viewport and selection in one pass, used when a refresh
    /// has relocated both by key.
    pub fn apply_refresh(&mut self, top: usize, selected: usize, model: &ObjectTree) {
        self.scroll = top.min(self.max_scroll(model));
        self.selected = if model.is_empty() {
            None
        } else {
            Some(selected.min(model.len() - 1))
        };
        self.refresh_block(model);
    }

    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        model: &mut ObjectTree,
    ) -> Result<bool, ProviderError> {
        match key.code {
            KeyCode::Up => {
                self.select_prev(model);
                self.update_scroll_for_selection();
                Ok(true)
            }
            KeyCode::Down => {
                self.select_next(model);
                self.update_scroll_for_selection();
                Ok(true)
            }
            KeyCode::PageUp => {
                self.select_page_up(model);
                self.update_scroll_for_selection();
                Ok(true)
            }
            KeyCode::PageDown => {
                self.select_page_down(model);
                self.update_scroll_for_selection();
                Ok(true)
            }
            KeyCode::Home => {
                self.select_first(model);
                self.update_scroll_for_selection();
                Ok(true)
            }
            KeyCode::End => {
                self.select_last(model);
                self.update_scroll_for_selection();
                Ok(true)
            }
            KeyCode::Left => {
                let handled = self.collapse_or_ascend(model)?;
                self.update_scroll_for_selection();
                Ok(handled)
            }
            KeyCode::Right => self.expand_selected(model),
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected(model),
            _ => Ok(false),
        }
    }

    /// Translate a mouse event inside `rows_area` (the region showing data
    /// rows, header and borders already excluded). A click on a row's glyph
    /// cells toggles it; a click anywhere else on the row selects it.
    pub fn handle_mouse(
        &mut self,
        event: MouseEvent,
        rows_area: Rect,
        model: &mut ObjectTree,
    ) -> Result<bool, ProviderError> {
        match event.kind {
            MouseEventKind::ScrollUp => {
                self.scroll = self.scroll.saturating_sub(3);
                Ok(true)
            }
            MouseEventKind::ScrollDown => {
                self.scroll = (self.scroll + 3).min(self.max_scroll(model));
                Ok(true)
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if !rows_area.contains((event.column, event.row).into()) {
                    return Ok(false);
                }
                let index = self.scroll + (event.row - rows_area.y) as usize;
                if index >= model.len() {
                    return Ok(false);
                }
                let column = event.column - rows_area.x;
                let on_glyph = self.glyph_range(model.node(index).level).contains(&column);
                if on_glyph && self.options.interactive && model.node(index).has_children {
                    // the glyph toggles without moving the selection
                    let old_len = model.len();
                    let changed = model.toggle(index)?;
                    if changed {
                        self.structure_changed(index, old_len, model);
                    }
                } else {
                    self.select(Some(index), model);
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Columns (relative to the row area) occupied by a row's branch and
    /// expand/collapse glyph at the given depth. The renderer lays the
    /// glyph out with the same arithmetic, so hit testing and drawing agree.
    pub fn glyph_range(&self, level: usize) -> std::ops::Range<u16> {
        let unit = self.options.indent_unit;
        let start = level as u16 * unit;
        start..start + unit + 1
    }

    fn max_scroll(&self, model: &ObjectTree) -> usize {
        if self.viewport_height == 0 {
            model.len().saturating_sub(1)
        } else {
            model.len().saturating_sub(self.viewport_height)
        }
    }

    /// The block of rows to shade: the selected row's own subtree when it
    /// is expanded with children, otherwise its parent's. The extent runs
    /// through every following row deeper than the block head.
    fn compute_block(&self, model: &ObjectTree) -> Option<(usize, usize)> {
        let index = self.selected?;
        let row = model.get(index)?;
        let head = if row.has_children && row.is_expanded() {
            index
        } else {
            model.parent_index(index)?
        };
        Some((head, model.subtree_end(head).saturating_sub(1)))
    }

    fn refresh_block(&mut self, model: &ObjectTree) {
        let new = self.compute_block(model);
        if new != self.block {
            self.damage = union_span(self.damage, union_span(self.block, new));
            self.block = new;
        }
    }
}

fn union_span(a: Option<(usize, usize)>, b: Option<(usize, usize)>) -> Option<(usize, usize)> {
    match (a, b) {
        (None, span) | (span, None) => span,
        (Some((a0, a1)), Some((b0, b1))) => Some((a0.min(b0), a1.max(b1))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::JsonProvider;
    use serde_json::json;
    use std::rc::Rc;

    fn model(doc: serde_json::Value) -> ObjectTree {
        let provider = Rc::new(JsonProvider::new(doc));
        let root = provider.root_handle();
        let mut tree = ObjectTree::new(provider);
        tree.initialize(root).unwrap();
        tree
    }

    fn view(model: &ObjectTree) -> TreeView {
        let mut view = TreeView::new(ViewOptions::default());
        view.set_viewport_height(10);
        view.reset(model);
        view
    }

    #[test]
    fn selection_clamps_to_row_count() {
        let tree = model(json!({"a": 1, "b": 2}));
        let mut v = view(&tree);
        v.select(Some(99), &tree);
        assert_eq!(v.selected(), Some(1));
    }

    #[test]
    fn scroll_follows_selection() {
        let tree = model(json!({"a":1,"b":2,"c":3,"d":4,"e":5,"f":6}));
        let mut v = view(&tree);
        v.set_viewport_height(3);
        v.select(Some(5), &tree);
        v.update_scroll_for_selection();
        assert_eq!(v.scroll(), 3);

        v.select(Some(0), &tree);
        v.update_scroll_for_selection();
        assert_eq!(v.scroll(), 0);
    }

    #[test]
    fn toggle_preserves_scroll_and_clamps_selection() {
        let tree = model(json!({"a": {"x": 1, "y": 2}, "b": 3}));
        let mut tree = tree;
        let mut v = view(&tree);

        v.select(Some(0), &tree);
        assert!(v.toggle_selected(&mut tree).unwrap());
        assert_eq!(tree.len(), 4);

        // collapse while the last row is selected: selection clamps back
        v.select(Some(3), &tree);
        tree.collapse(0);
        v.after_structure_change(&tree);
        assert_eq!(tree.len(), 2);
        assert_eq!(v.selected(), Some(1));
    }

    #[test]
    fn read_only_view_ignores_structural_input() {
        let mut tree = model(json!({"a": {"x": 1}}));
        let mut v = TreeView::new(ViewOptions {
            interactive: false,
            ..ViewOptions::default()
        });
        v.reset(&tree);
        assert!(!v.toggle_selected(&mut tree).unwrap());
        assert!(!v.expand_selected(&mut tree).unwrap());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn left_collapses_then_ascends() {
        let mut tree = model(json!({"a": {"x": {"q": 1}}}));
        let mut v = view(&tree);
        tree.expand(0).unwrap();
        tree.expand(1).unwrap();
        v.after_structure_change(&tree);

        v.select(Some(1), &tree); // "x", expanded
        v.collapse_or_ascend(&mut tree).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(v.selected(), Some(1));

        v.collapse_or_ascend(&mut tree).unwrap(); // now collapsed: ascend
        assert_eq!(v.selected(), Some(0));
    }

    #[test]
    fn collapsing_an_earlier_row_keeps_selection_on_the_same_row() {
        let mut tree = model(json!({"first": {"c1": 1, "c2": 2}, "last": 3}));
        let mut v = view(&tree);
        tree.expand(0).unwrap();
        v.after_structure_change(&tree);
        // [first, c1, c2, last]
        v.select(Some(3), &tree);

        let old_len = tree.len();
        tree.collapse(0);
        v.structure_changed(0, old_len, &tree);

        assert_eq!(v.selected(), Some(1));
        assert_eq!(tree.node(1).name, "last");
    }

    #[test]
    fn block_is_own_subtree_when_expanded() {
        let mut tree = model(json!({"a": {"x": 1, "y": 2}, "b": 3}));
        tree.expand(0).unwrap();
        // [a, x, y, b]
        let mut v = view(&tree);
        v.select(Some(0), &tree);
        assert_eq!(v.shaded_block(), Some((0, 2)));
    }

    #[test]
    fn block_is_parents_subtree_for_leaves() {
        let mut tree = model(json!({"a": {"x": 1, "y": 2}, "b": 3}));
        tree.expand(0).unwrap();
        let mut v = view(&tree);
        v.select(Some(2), &tree); // y, a leaf
        assert_eq!(v.shaded_block(), Some((0, 2)));

        v.select(Some(3), &tree); // b, level-0 leaf: no ancestor, no block
        assert_eq!(v.shaded_block(), None);
    }

    #[test]
    fn damage_covers_previous_and_new_block() {
        let mut tree = model(json!({"a": {"x": 1}, "b": {"y": 1}}));
        tree.expand(0).unwrap();
        tree.expand(2).unwrap();
        // [a, x, b, y]
        let mut v = view(&tree);
        v.select(Some(0), &tree);
        let _ = v.take_damage();

        v.select(Some(2), &tree);
        assert_eq!(v.shaded_block(), Some((2, 3)));
        assert_eq!(v.take_damage(), Some((0, 3)));
        assert_eq!(v.take_damage(), None, "damage is consumed");
    }

    #[test]
    fn glyph_hit_rectangle_tracks_indentation() {
        let tree = model(json!({"a": 1}));
        let v = view(&tree);
        assert_eq!(v.glyph_range(0), 0..3);
        assert_eq!(v.glyph_range(2), 4..7);
    }

    #[test]
    fn mouse_click_on_glyph_toggles_and_elsewhere_selects() {
        let mut tree = model(json!({"a": {"x": 1}, "b": 2}));
        let mut v = view(&tree);
        let area = Rect::new(1, 1, 40, 10);

        let click = |column: u16, row: u16| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: crossterm::event::KeyModifiers::NONE,
        };

        // click on the name text of row 1 selects without toggling
        v.handle_mouse(click(10, 2), area, &mut tree).unwrap();
        assert_eq!(v.selected(), Some(1));
        assert_eq!(tree.len(), 2);

        // click on row 0's glyph cells expands it without moving the
        // selection off "b", whose index shifted
        v.handle_mouse(click(1, 1), area, &mut tree).unwrap();
        assert_eq!(tree.len(), 3);
        assert!(tree.is_expanded(0));
        assert_eq!(v.selected(), Some(2));
        assert_eq!(tree.node(2).name, "b");
    }
}
