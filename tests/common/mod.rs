//! Shared fixtures: a synthetic in-memory object graph and its provider,
//! for tests that need shapes or behaviors the JSON provider cannot
//! produce (disappearing objects, scripted sibling orders).

use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

use treescope::object::ObjectHandle;
use treescope::provider::{ChildEntry, ObjectProvider, ProviderError};

pub struct SampleObject {
    pub name: String,
    pub value: String,
    pub type_name: String,
    pub children: Vec<Rc<SampleObject>>,
    /// Marks this object as one the provider reports as not surviving a
    /// refresh.
    pub doomed: Cell<bool>,
}

pub fn leaf(name: &str, value: &str) -> Rc<SampleObject> {
    Rc::new(SampleObject {
        name: name.to_string(),
        value: value.to_string(),
        type_name: "leaf".to_string(),
        children: Vec::new(),
        doomed: Cell::new(false),
    })
}

pub fn branch(name: &str, children: Vec<Rc<SampleObject>>) -> Rc<SampleObject> {
    Rc::new(SampleObject {
        name: name.to_string(),
        value: format!("{{{}}}", children.len()),
        type_name: "branch".to_string(),
        children,
        doomed: Cell::new(false),
    })
}

pub struct SyntheticProvider {
    root: Rc<SampleObject>,
}

impl SyntheticProvider {
    pub fn new(root: Rc<SampleObject>) -> Rc<Self> {
        Rc::new(Self { root })
    }

    pub fn root_handle(&self) -> ObjectHandle {
        Self::handle(&self.root)
    }

    /// Identity is the object's address: the provider owns the one tree for
    /// its whole lifetime, so addresses are stable across rebuilds.
    fn handle(object: &Rc<SampleObject>) -> ObjectHandle {
        let identity = Rc::as_ptr(object) as usize as u64;
        ObjectHandle::from_rc(object.clone() as Rc<dyn Any>, identity)
    }

    fn object_of(handle: &ObjectHandle) -> Result<&SampleObject, ProviderError> {
        handle
            .downcast_ref::<SampleObject>()
            .ok_or(ProviderError::ForeignHandle)
    }
}

impl ObjectProvider for SyntheticProvider {
    fn can_have_children(&self, object: &ObjectHandle) -> bool {
        Self::object_of(object).is_ok_and(|o| !o.children.is_empty())
    }

    fn children(&self, object: &ObjectHandle) -> Result<Vec<ChildEntry>, ProviderError> {
        let parent = Self::object_of(object)?;
        Ok(parent
            .children
            .iter()
            .map(|child| ChildEntry {
                name: child.name.clone(),
                value: child.value.clone(),
                type_name: child.type_name.clone(),
                object: Self::handle(child),
                reconstituted: None,
                has_children: !child.children.is_empty(),
            })
            .collect())
    }

    fn will_disappear_on_refresh(&self, object: &ObjectHandle) -> bool {
        Self::object_of(object).is_ok_and(|o| o.doomed.get())
    }
}
