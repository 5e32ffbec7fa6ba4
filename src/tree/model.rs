use std::rc::Rc;

use crate::object::ObjectHandle;
use crate::provider::{ObjectProvider, ProviderError};
use crate::tree::node::Node;

/// Phase reported to the expand hook around a provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandPhase {
    /// About to call into the provider; a good moment for a busy affordance.
    Began,
    /// The provider call returned, successfully or not.
    Finished,
}

/// Non-blocking notification around a potentially slow expansion. Purely
/// informational: it cannot cancel the call, and the expansion is still
/// synchronous from the model's point of view.
pub type ExpandHook = Box<dyn Fn(ExpandPhase, &Node)>;

/// The flattened tree: an ordered sequence of the *currently visible* rows.
///
/// Collapsed subtrees contribute zero rows. The sequence is always a
/// pre-order walk: an expanded row's materialized children occupy the
/// indices immediately after it, each followed recursively by its own
/// expanded descendants, before the next sibling appears. Sibling order is
/// whatever the provider yielded; the model never sorts.
///
/// There is deliberately no linked tree behind this. Structure lives in the
/// `level` staircase, and the relationship queries below answer everything
/// rendering needs with bounded forward/backward scans.
pub struct ObjectTree {
    rows: Vec<Node>,
    root: Option<ObjectHandle>,
    provider: Rc<dyn ObjectProvider>,
    expand_hook: Option<ExpandHook>,
}

impl ObjectTree {
    /// An empty model; call [`initialize`](Self::initialize) to populate it.
    pub fn new(provider: Rc<dyn ObjectProvider>) -> Self {
        Self {
            rows: Vec::new(),
            root: None,
            provider,
            expand_hook: None,
        }
    }

    /// Discard all rows and rebuild level 0 from `root`'s children.
    ///
    /// Children of those rows are not enumerated; `has_children` comes from
    /// the entries the provider yields. A root with nothing to enumerate
    /// produces zero rows and is not an error.
    ///
    /// Enumeration happens before the old rows are discarded, so a failing
    /// provider leaves the previous sequence fully intact.
    pub fn initialize(&mut self, root: ObjectHandle) -> Result<(), ProviderError> {
        let entries = if self.provider.can_have_children(&root) {
            self.provider.children(&root)?
        } else {
            Vec::new()
        };
        tracing::debug!(rows = entries.len(), "initialized tree model");
        self.rows = entries
            .into_iter()
            .map(|entry| Node::from_entry(entry, 0))
            .collect();
        self.root = Some(root);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row at `index`. Panics when out of range, like slice indexing;
    /// callers clamp against [`len`](Self::len) first.
    pub fn node(&self, index: usize) -> &Node {
        &self.rows[index]
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[Node] {
        &self.rows
    }

    pub fn root(&self) -> Option<&ObjectHandle> {
        self.root.as_ref()
    }

    pub fn provider(&self) -> &Rc<dyn ObjectProvider> {
        &self.provider
    }

    pub fn set_expand_hook(&mut self, hook: ExpandHook) {
        self.expand_hook = Some(hook);
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.rows[index].expanded
    }

    /// Expand a collapsed row or collapse an expanded one. Returns whether
    /// the row sequence changed; `Ok(false)` for childless rows.
    pub fn toggle(&mut self, index: usize) -> Result<bool, ProviderError> {
        if !self.rows[index].has_children {
            return Ok(false);
        }
        if self.rows[index].expanded {
            Ok(self.collapse(index))
        } else {
            self.expand(index)
        }
    }

    /// Materialize the row's children and splice them in right after it.
    ///
    /// The provider call may be slow; the expand hook is invoked around it.
    /// On provider failure the row stays collapsed and the sequence is
    /// untouched. Returns `Ok(false)` when there was nothing to do (already
    /// expanded, or no children).
    pub fn expand(&mut self, index: usize) -> Result<bool, ProviderError> {
        let row = &self.rows[index];
        if !row.has_children || row.expanded {
            return Ok(false);
        }
        let target = row.navigation_object().clone();
        let child_level = row.level + 1;

        self.notify(ExpandPhase::Began, index);
        let result = self.provider.children(&target);
        self.notify(ExpandPhase::Finished, index);

        let entries = result?;
        let children: Vec<Node> = entries
            .into_iter()
            .map(|entry| Node::from_entry(entry, child_level))
            .collect();
        self.rows[index].expanded = true;
        self.rows.splice(index + 1..index + 1, children);
        Ok(true)
    }

    /// Remove the contiguous block of the row's visible descendants.
    /// Returns whether anything changed.
    pub fn collapse(&mut self, index: usize) -> bool {
        if !self.rows[index].expanded {
            return false;
        }
        let end = self.subtree_end(index);
        self.rows.drain(index + 1..end);
        self.rows[index].expanded = false;
        true
    }

    /// One past the last visible descendant of the row at `index`: the first
    /// following index whose level is not deeper, or the end of the rows.
    pub fn subtree_end(&self, index: usize) -> usize {
        let level = self.rows[index].level;
        self.rows[index + 1..]
            .iter()
            .position(|row| row.level <= level)
            .map(|offset| index + 1 + offset)
            .unwrap_or(self.rows.len())
    }

    /// Whether the row is the last of its sibling run currently visible:
    /// scanning forward, a row at the same level appears before any
    /// shallower row. Rendering stops the vertical connector at the row's
    /// midline when this is true.
    pub fn is_last_visible_sibling(&self, index: usize) -> bool {
        let level = self.rows[index].level;
        for row in &self.rows[index + 1..] {
            if row.level < level {
                return true;
            }
            if row.level == level {
                return false;
            }
        }
        true
    }

    /// Whether some later row sits at exactly `level` before any row
    /// shallower than `level` ends the search. Rendering keeps an ancestor's
    /// vertical guide running past this row while that holds, because a
    /// later subtree of that ancestor is still coming.
    pub fn level_continues_below(&self, index: usize, level: usize) -> bool {
        for row in &self.rows[index + 1..] {
            if row.level < level {
                return false;
            }
            if row.level == level {
                return true;
            }
        }
        false
    }

    /// Index of the logical parent row: the nearest preceding row one level
    /// shallower. `None` for level-0 rows.
    pub fn parent_index(&self, index: usize) -> Option<usize> {
        let level = self.rows[index].level;
        if level == 0 {
            return None;
        }
        (0..index).rev().find(|&i| self.rows[i].level == level - 1)
    }

    fn notify(&self, phase: ExpandPhase, index: usize) {
        if let Some(hook) = &self.expand_hook {
            hook(phase, &self.rows[index]);
        }
    }
}
