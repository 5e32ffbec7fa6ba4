//! One inspected root object: a tree model, its view state, and the
//! refresh operation that rebuilds the first while preserving the second.

use std::rc::Rc;

use rustc_hash::FxHashSet;

use crate::object::ObjectHandle;
use crate::provider::{ObjectProvider, ProviderError};
use crate::tree::{ExpandHook, Node, NodeKey, ObjectTree, TreeView, ViewOptions};

/// Where a refresh currently stands. Refresh is synchronous, so outside of
/// a `refresh()` call this is always `Idle`; the phase is still tracked and
/// reported to the observer because the restore loop can re-enter view code
/// (redraw callbacks fire while the row count is changing under them).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    Idle,
    /// Recording top/selected/expanded keys from the old rows.
    Capturing,
    /// The model is being reinitialized; row indices are meaningless.
    Rebuilding,
    /// Re-expanding by key and relocating the anchors.
    Restoring,
}

/// State captured before a rebuild. Everything here is keyed by identity,
/// never by row index: indices do not survive `initialize`.
struct CapturedAnchors {
    top_key: Option<NodeKey>,
    selected_key: Option<NodeKey>,
    expanded_keys: FxHashSet<NodeKey>,
}

/// Owns exactly one [`ObjectTree`]/[`TreeView`] pair for one root object.
pub struct Session {
    tree: ObjectTree,
    view: TreeView,
    phase: RefreshPhase,
}

impl Session {
    pub fn new(provider: Rc<dyn ObjectProvider>, options: ViewOptions) -> Self {
        Self {
            tree: ObjectTree::new(provider),
            view: TreeView::new(options),
            phase: RefreshPhase::Idle,
        }
    }

    /// Build the model from scratch for `root` and reset the view.
    pub fn initialize(&mut self, root: ObjectHandle) -> Result<(), ProviderError> {
        self.tree.initialize(root)?;
        self.view.reset(&self.tree);
        Ok(())
    }

    pub fn tree(&self) -> &ObjectTree {
        &self.tree
    }

    pub fn view(&self) -> &TreeView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut TreeView {
        &mut self.view
    }

    /// Split borrow for input handling: the view mutates the tree.
    pub fn view_and_tree_mut(&mut self) -> (&mut TreeView, &mut ObjectTree) {
        (&mut self.view, &mut self.tree)
    }

    pub fn row_count(&self) -> usize {
        self.tree.len()
    }

    pub fn current_node(&self) -> Option<&Node> {
        self.view.selected().and_then(|i| self.tree.get(i))
    }

    pub fn phase(&self) -> RefreshPhase {
        self.phase
    }

    pub fn set_expand_hook(&mut self, hook: ExpandHook) {
        self.tree.set_expand_hook(hook);
    }

    /// Rebuild the model from the same root while preserving the viewport
    /// anchor, the selection, and the set of expanded rows across the
    /// rebuild, matching rows by key rather than by position.
    ///
    /// A failing rebuild aborts the refresh with the previous rows and view
    /// state fully intact. A row whose key no longer exists afterwards is
    /// silently dropped from the restored state; a vanished selection falls
    /// back to row 0.
    pub fn refresh(&mut self) -> Result<(), ProviderError> {
        let Some(root) = self.tree.root().cloned() else {
            return Ok(());
        };

        self.phase = RefreshPhase::Capturing;
        let anchors = self.capture_anchors();

        self.phase = RefreshPhase::Rebuilding;
        if let Err(e) = self.tree.initialize(root) {
            self.phase = RefreshPhase::Idle;
            return Err(e);
        }

        self.phase = RefreshPhase::Restoring;
        let mut expanded = anchors.expanded_keys;
        let mut top_row = None;
        let mut selected_row = None;
        let mut index = 0;
        // The row count grows as re-expansion splices children in below the
        // scan position, so the bound is re-read on every step.
        while index < self.tree.len() {
            let key = self.tree.node(index).key();
            if anchors.top_key == Some(key) && top_row.is_none() {
                top_row = Some(index);
            }
            if anchors.selected_key == Some(key) && selected_row.is_none() {
                selected_row = Some(index);
            }
            // Each key re-expands at most once; duplicates stay collapsed.
            if expanded.remove(&key) {
                if let Err(e) = self.tree.expand(index) {
                    tracing::warn!(row = index, error = %e, "re-expansion failed during refresh");
                }
            }
            index += 1;
        }

        self.view.apply_refresh(
            top_row.unwrap_or(0),
            selected_row.unwrap_or(0),
            &self.tree,
        );
        self.phase = RefreshPhase::Idle;
        tracing::debug!(
            rows = self.tree.len(),
            dropped_keys = expanded.len(),
            "refresh complete"
        );
        Ok(())
    }

    fn capture_anchors(&self) -> CapturedAnchors {
        let top_key = self
            .tree
            .get(self.view.scroll())
            .map(|node| node.key());

        // When the provider says the selected object itself will not exist
        // after the rebuild, anchor on its parent instead.
        let selected_key = self.view.selected().and_then(|index| {
            let node = self.tree.get(index)?;
            if self.tree.provider().will_disappear_on_refresh(node.original()) {
                let parent = self.tree.parent_index(index)?;
                Some(self.tree.node(parent).key())
            } else {
                Some(node.key())
            }
        });

        let expanded_keys = self
            .tree
            .rows()
            .iter()
            .filter(|node| node.is_expanded())
            .map(|node| node.key())
            .collect();

        CapturedAnchors {
            top_key,
            selected_key,
            expanded_keys,
        }
    }
}
