//! Reference provider over a `serde_json` document.
//!
//! Every handle names a value by (realm, JSON pointer): realm 0 is the main
//! document, other realms are documents parsed out of embedded JSON strings.
//! Identities are derived from that path, so the logically-same value keeps
//! its identity across a full rebuild even after the document is re-read.

use std::cell::RefCell;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHasher};
use serde_json::Value;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use super::{ChildEntry, ObjectProvider, ProviderError};
use crate::object::ObjectHandle;

const MAIN_REALM: u64 = 0;

/// Position of one value inside one of the provider's documents.
#[derive(Debug, Clone)]
struct JsonNode {
    realm: u64,
    pointer: String,
}

/// Provider that enumerates a JSON document's object members and array
/// elements. Strings that themselves contain a JSON container can optionally
/// be reconstituted into navigable subtrees.
pub struct JsonProvider {
    main: RefCell<Rc<Value>>,
    embedded: RefCell<FxHashMap<u64, Rc<Value>>>,
    value_width: usize,
    parse_embedded: bool,
}

impl JsonProvider {
    pub fn new(document: Value) -> Self {
        Self {
            main: RefCell::new(Rc::new(document)),
            embedded: RefCell::new(FxHashMap::default()),
            value_width: 60,
            parse_embedded: true,
        }
    }

    /// Maximum display width of rendered values before elision.
    pub fn with_value_width(mut self, width: usize) -> Self {
        self.value_width = width.max(4);
        self
    }

    /// Enable or disable reconstitution of embedded JSON strings.
    pub fn with_embedded_parsing(mut self, enabled: bool) -> Self {
        self.parse_embedded = enabled;
        self
    }

    /// Handle for the document root, the value `initialize` starts from.
    pub fn root_handle(&self) -> ObjectHandle {
        self.handle(MAIN_REALM, String::new())
    }

    /// Swap in a new document, e.g. after the backing file changed on disk.
    /// Embedded realms are dropped; they repopulate as rows are re-expanded.
    pub fn replace_document(&self, document: Value) {
        *self.main.borrow_mut() = Rc::new(document);
        self.embedded.borrow_mut().clear();
    }

    fn handle(&self, realm: u64, pointer: String) -> ObjectHandle {
        let identity = path_identity(realm, &pointer);
        ObjectHandle::new(JsonNode { realm, pointer }, identity)
    }

    fn realm_document(&self, realm: u64) -> Option<Rc<Value>> {
        if realm == MAIN_REALM {
            Some(self.main.borrow().clone())
        } else {
            self.embedded.borrow().get(&realm).cloned()
        }
    }

    fn node_of(object: &ObjectHandle) -> Result<&JsonNode, ProviderError> {
        object
            .downcast_ref::<JsonNode>()
            .ok_or(ProviderError::ForeignHandle)
    }

    fn resolve(&self, node: &JsonNode) -> Result<Rc<Value>, ProviderError> {
        let doc = self
            .realm_document(node.realm)
            .ok_or_else(|| ProviderError::Vanished(node.pointer.clone()))?;
        if doc.pointer(&node.pointer).is_none() {
            return Err(ProviderError::Vanished(node.pointer.clone()));
        }
        Ok(doc)
    }

    fn entry_for(&self, realm: u64, pointer: String, name: String, value: &Value) -> ChildEntry {
        let object = self.handle(realm, pointer);

        if self.parse_embedded {
            if let Value::String(text) = value {
                if let Some(parsed) = parse_embedded_container(text) {
                    let has_children = container_has_children(&parsed);
                    let embedded_realm = object.identity();
                    self.embedded
                        .borrow_mut()
                        .insert(embedded_realm, Rc::new(parsed));
                    let reconstituted = self.handle(embedded_realm, String::new());
                    return ChildEntry {
                        name,
                        value: elide(&render_string(text), self.value_width),
                        type_name: "string".to_string(),
                        object,
                        reconstituted: Some(reconstituted),
                        has_children,
                    };
                }
            }
        }

        ChildEntry {
            name,
            value: self.render_value(value),
            type_name: type_name(value).to_string(),
            object,
            reconstituted: None,
            has_children: container_has_children(value),
        }
    }

    fn render_value(&self, value: &Value) -> String {
        let rendered = match value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => render_string(s),
            Value::Array(items) => match items.len() {
                0 => "[]".to_string(),
                1 => "[1 item]".to_string(),
                n => format!("[{n} items]"),
            },
            Value::Object(members) => match members.len() {
                0 => "{}".to_string(),
                1 => "{1 member}".to_string(),
                n => format!("{{{n} members}}"),
            },
        };
        elide(&rendered, self.value_width)
    }
}

impl ObjectProvider for JsonProvider {
    fn can_have_children(&self, object: &ObjectHandle) -> bool {
        let Ok(node) = Self::node_of(object) else {
            return false;
        };
        let Ok(doc) = self.resolve(node) else {
            return false;
        };
        match doc.pointer(&node.pointer) {
            Some(value @ (Value::Object(_) | Value::Array(_))) => container_has_children(value),
            Some(Value::String(s)) => self.parse_embedded && looks_like_container(s),
            _ => false,
        }
    }

    fn children(&self, object: &ObjectHandle) -> Result<Vec<ChildEntry>, ProviderError> {
        let node = Self::node_of(object)?;
        let doc = self.resolve(node)?;
        let value = doc
            .pointer(&node.pointer)
            .ok_or_else(|| ProviderError::Vanished(node.pointer.clone()))?;

        match value {
            Value::Object(members) => Ok(members
                .iter()
                .map(|(key, child)| {
                    let pointer = format!("{}/{}", node.pointer, escape_pointer_token(key));
                    self.entry_for(node.realm, pointer, key.clone(), child)
                })
                .collect()),
            Value::Array(items) => Ok(items
                .iter()
                .enumerate()
                .map(|(index, child)| {
                    let pointer = format!("{}/{index}", node.pointer);
                    self.entry_for(node.realm, pointer, format!("[{index}]"), child)
                })
                .collect()),
            // A string reached directly (the document root can be one):
            // enumerate the embedded container it contains, if any.
            Value::String(text) if self.parse_embedded => {
                match parse_embedded_container(text) {
                    Some(parsed) => {
                        let realm = object.identity();
                        self.embedded.borrow_mut().insert(realm, Rc::new(parsed));
                        let root = self.handle(realm, String::new());
                        self.children(&root)
                    }
                    None => Ok(Vec::new()),
                }
            }
            _ => Ok(Vec::new()),
        }
    }
}

fn path_identity(realm: u64, pointer: &str) -> u64 {
    let mut hasher = FxHasher::default();
    realm.hash(&mut hasher);
    pointer.hash(&mut hasher);
    hasher.finish()
}

/// JSON pointer token escaping per RFC 6901.
fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn container_has_children(value: &Value) -> bool {
    match value {
        Value::Object(members) => !members.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

fn looks_like_container(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}

fn parse_embedded_container(text: &str) -> Option<Value> {
    if !looks_like_container(text) {
        return None;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Some(value),
        _ => None,
    }
}

/// Render a string value with JSON quoting and escapes.
fn render_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("{s:?}"))
}

/// Truncate to a display width, appending an ellipsis when anything was cut.
fn elide(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max_width.saturating_sub(1) {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}
