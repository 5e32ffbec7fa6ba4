// Child-enumeration providers: the seam between the tree core and whatever
// object model is being inspected. The core only ever sees `ObjectHandle`s
// and the descriptors returned here; it never assumes a concrete data model.

pub mod json;

use thiserror::Error;

use crate::object::ObjectHandle;

pub use json::JsonProvider;

/// Errors surfaced by a provider while enumerating children.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The handle does not refer to an object this provider understands.
    #[error("handle does not belong to this provider")]
    ForeignHandle,

    /// The object the handle refers to no longer exists in the source graph.
    #[error("object vanished from the source graph: {0}")]
    Vanished(String),

    /// Enumeration itself failed.
    #[error("child enumeration failed: {0}")]
    Enumeration(String),
}

/// One child yielded by [`ObjectProvider::children`].
///
/// `has_children` must come from the provider's cheap check; returning a
/// child never requires enumerating grandchildren. When the underlying
/// object is not directly navigable (a raw serialized blob, say),
/// `reconstituted` carries the object that expansion should walk instead.
#[derive(Debug, Clone)]
pub struct ChildEntry {
    pub name: String,
    pub value: String,
    pub type_name: String,
    pub object: ObjectHandle,
    pub reconstituted: Option<ObjectHandle>,
    pub has_children: bool,
}

/// Supplies named children for arbitrary domain objects.
///
/// Providers own the objects behind the handles they produce and are
/// responsible for breaking cycles in cyclic graphs (for example with a
/// visited set keyed by object identity); the tree core deliberately keeps
/// no visited state of its own.
pub trait ObjectProvider {
    /// Cheap test for whether expansion could yield anything. Must not
    /// enumerate children.
    fn can_have_children(&self, object: &ObjectHandle) -> bool;

    /// Enumerate the object's children, in the order they should appear.
    /// May be expensive; only called when a row is actually expanded.
    fn children(&self, object: &ObjectHandle) -> Result<Vec<ChildEntry>, ProviderError>;

    /// Whether this exact object will not exist after the source graph is
    /// re-read. Used to pick a surviving selection anchor before a refresh.
    fn will_disappear_on_refresh(&self, _object: &ObjectHandle) -> bool {
        false
    }
}
