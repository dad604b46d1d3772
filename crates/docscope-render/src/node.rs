//! Rendered output nodes.
//!
//! A [`Node`] is what a renderer returns. Built-in primitives materialise as
//! [`Node::Element`] values named after the primitive; custom components may
//! return any node shape. Nodes are plain data: turning them into HTML or a
//! DOM is left to the page-assembly layer.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A single property value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum PropValue {
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl PropValue {
    /// Borrow the value as a string slice if it is textual.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Return the value as a boolean if it is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Return the value as an integer if it is one.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for PropValue {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Text(value.to_string()), Self::Int)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
        }
    }
}

/// Opaque external reference forwarded to a renderer.
///
/// Page-assembly code uses handles for focus management or measurement of the
/// element a renderer produces. The resolver never inspects them; it only
/// forwards the handle to whichever renderer it selects. Two handles compare
/// equal when they point at the same allocation.
#[derive(Clone)]
pub struct Handle(Arc<dyn Any + Send + Sync>);

impl Handle {
    /// Wrap a value as a handle.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Borrow the wrapped value if it has type `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Whether both handles refer to the same value.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:p})", Arc::as_ptr(&self.0))
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

/// An element produced by a built-in primitive (or built by a component).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Element {
    /// Primitive name, e.g. `h1` or `pre`.
    pub name: String,
    /// User-visible attributes.
    pub attrs: BTreeMap<String, PropValue>,
    /// Rendered children in document order.
    pub children: Vec<Node>,
    /// Handle forwarded from the property bag, if any.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub handle: Option<Handle>,
}

impl Element {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Get an attribute by name.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&PropValue> {
        self.attrs.get(key)
    }
}

/// Rendered output of one content node.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "value", rename_all = "lowercase"))]
pub enum Node {
    /// Literal text.
    Text(String),
    /// Markup carried through verbatim (raw HTML in the source). Never
    /// escaped, and not part of [`Node::text_content`].
    Raw(String),
    /// Named element.
    Element(Element),
    /// Sequence of nodes without a wrapping element.
    Fragment(Vec<Node>),
}

impl Node {
    /// Create a text node.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Element name, or `None` for text and fragments.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Element(el) => Some(&el.name),
            _ => None,
        }
    }

    /// Borrow as an element.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Create a raw markup node.
    #[must_use]
    pub fn raw(s: impl Into<String>) -> Self {
        Self::Raw(s.into())
    }

    /// Concatenated text of this node and all descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(s) => out.push_str(s),
            Self::Raw(_) => {}
            Self::Element(el) => el.children.iter().for_each(|c| c.collect_text(out)),
            Self::Fragment(nodes) => nodes.iter().for_each(|c| c.collect_text(out)),
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_content_nested() {
        let node = Node::from(
            Element::new("p")
                .with_child("Hello, ")
                .with_child(Element::new("strong").with_child("world")),
        );
        assert_eq!(node.text_content(), "Hello, world");
    }

    #[test]
    fn test_text_content_fragment() {
        let node = Node::Fragment(vec![Node::text("a"), Node::text("b")]);
        assert_eq!(node.text_content(), "ab");
    }

    #[test]
    fn test_handle_identity() {
        let a = Handle::new(42_u32);
        let b = a.clone();
        let c = Handle::new(42_u32);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.downcast_ref::<u32>(), Some(&42));
        assert!(a.downcast_ref::<String>().is_none());
    }

    #[test]
    fn test_prop_value_from_large_u64() {
        assert_eq!(PropValue::from(7_u64), PropValue::Int(7));
        assert_eq!(
            PropValue::from(u64::MAX),
            PropValue::Text(u64::MAX.to_string())
        );
    }

    #[test]
    fn test_element_name() {
        let node = Node::from(Element::new("hr"));
        assert_eq!(node.name(), Some("hr"));
        assert_eq!(Node::text("x").name(), None);
    }

    #[test]
    fn test_raw_excluded_from_text_content() {
        let node = Node::from(
            Element::new("p")
                .with_child("a ")
                .with_child(Node::raw("<b>"))
                .with_child("x"),
        );
        assert_eq!(node.text_content(), "a x");
        assert_eq!(Node::raw("<br>").name(), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize_adjacently_tagged() {
        let node = Node::Fragment(vec![
            Element::new("p")
                .with_attr("id", "intro")
                .with_attr("hidden", false)
                .with_child("hi")
                .with_child(Node::raw("<br>"))
                .into(),
        ]);

        let value = serde_json::to_value(&node).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "type": "fragment",
                "value": [{
                    "type": "element",
                    "value": {
                        "name": "p",
                        "attrs": { "hidden": false, "id": "intro" },
                        "children": [
                            { "type": "text", "value": "hi" },
                            { "type": "raw", "value": "<br>" },
                        ],
                    },
                }],
            })
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize_skips_handle() {
        let el = Element::new("div").with_attr("n", 3_i64);
        let el = Element {
            handle: Some(Handle::new(1_u8)),
            ..el
        };

        let value = serde_json::to_value(&el).unwrap();

        assert_eq!(
            value,
            serde_json::json!({ "name": "div", "attrs": { "n": 3 }, "children": [] })
        );
    }
}
