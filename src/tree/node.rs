use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::object::ObjectHandle;
use crate::provider::ChildEntry;

/// Identity of a row that survives a full model rebuild.
///
/// Derived from the object's provider identity, its depth, and the three
/// display columns. Two rows built from the logically-same data in two
/// different rebuilds compare equal even though they are distinct `Node`
/// instances. The key is a 64-bit digest: a collision makes two distinct
/// logical rows indistinguishable across a refresh, which at worst
/// re-expands or re-selects the wrong one of the pair — accepted as a
/// bounded risk rather than a correctness guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey(u64);

impl NodeKey {
    pub(crate) fn derive(
        identity: u64,
        level: usize,
        name: &str,
        value: &str,
        type_name: &str,
    ) -> Self {
        let mut hasher = FxHasher::default();
        identity.hash(&mut hasher);
        level.hash(&mut hasher);
        name.hash(&mut hasher);
        value.hash(&mut hasher);
        type_name.hash(&mut hasher);
        NodeKey(hasher.finish())
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// One visible row of the flattened tree.
///
/// A `Node` is row data, not a tree node: it owns no children. Its position
/// in the model's row sequence plus its `level` encode all structure, and
/// parenthood is answered by the model's backward scan rather than a stored
/// back-pointer.
#[derive(Debug, Clone)]
pub struct Node {
    /// Indentation depth; root-level siblings sit at 0.
    pub level: usize,
    /// Whether expansion could yield rows. Set from the provider's cheap
    /// check, independent of whether children were ever materialized.
    pub has_children: bool,
    pub name: String,
    pub value: String,
    pub type_name: String,
    original: ObjectHandle,
    reconstituted: Option<ObjectHandle>,
    pub(crate) expanded: bool,
    key: NodeKey,
}

impl Node {
    pub(crate) fn from_entry(entry: ChildEntry, level: usize) -> Self {
        let key = NodeKey::derive(
            entry.object.identity(),
            level,
            &entry.name,
            &entry.value,
            &entry.type_name,
        );
        Self {
            level,
            has_children: entry.has_children,
            name: entry.name,
            value: entry.value,
            type_name: entry.type_name,
            original: entry.object,
            reconstituted: entry.reconstituted,
            expanded: false,
            key,
        }
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// The domain object this row represents.
    pub fn original(&self) -> &ObjectHandle {
        &self.original
    }

    /// The substituted object, when the original is not directly navigable.
    pub fn reconstituted(&self) -> Option<&ObjectHandle> {
        self.reconstituted.as_ref()
    }

    /// The handle expansion walks: the reconstituted object when present,
    /// the original otherwise.
    pub fn navigation_object(&self) -> &ObjectHandle {
        self.reconstituted.as_ref().unwrap_or(&self.original)
    }
}
