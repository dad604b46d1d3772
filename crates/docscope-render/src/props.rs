//! Property bags passed to renderers.
//!
//! A [`PropertyBag`] carries three kinds of data:
//!
//! - user-visible attributes (forwarded to the renderer),
//! - the children payload and an optional forwarded [`Handle`] (forwarded),
//! - resolver bookkeeping: `originalType`, `mdxType`, `parentName` and a
//!   per-element `components` overlay (never forwarded).
//!
//! Bags are values. [`PropertyBag::merge`] folds several sources into a new bag
//! and leaves the inputs untouched.

use std::collections::BTreeMap;

use crate::node::{Handle, Node, PropValue};
use crate::renderer::{Renderer, RendererMap};

/// Attribute keys reserved for resolver bookkeeping.
///
/// Values stored under these keys are consumed by the resolver and stripped
/// before a renderer is invoked.
pub const RESERVED_KEYS: [&str; 4] = ["components", "mdxType", "originalType", "parentName"];

/// Whether `key` is reserved for resolver bookkeeping.
#[must_use]
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Named inputs for one renderer invocation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyBag {
    attrs: BTreeMap<String, PropValue>,
    children: Option<Vec<Node>>,
    handle: Option<Handle>,
    original_type: Option<Renderer>,
    mdx_type: Option<String>,
    parent_name: Option<String>,
    components: Option<RendererMap>,
}

/// Bookkeeping split off a bag before the renderer sees it.
#[derive(Debug, Default)]
pub(crate) struct Bookkeeping {
    pub original_type: Option<Renderer>,
    pub mdx_type: Option<String>,
    pub parent_name: Option<String>,
    pub components: Option<RendererMap>,
}

impl PropertyBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bag holding only a children payload.
    #[must_use]
    pub fn with_children_only(children: impl IntoIterator<Item = Node>) -> Self {
        Self::new().with_children(children)
    }

    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.attrs.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&PropValue> {
        self.attrs.get(key)
    }

    /// Attribute as a string slice, if present and textual.
    #[must_use]
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(PropValue::as_str)
    }

    #[must_use]
    pub fn attrs(&self) -> &BTreeMap<String, PropValue> {
        &self.attrs
    }

    /// Replace the children payload.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children = Some(children.into_iter().collect());
        self
    }

    /// Append one child, creating the payload if needed.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.push_child(child);
        self
    }

    pub fn push_child(&mut self, child: impl Into<Node>) {
        self.children.get_or_insert_with(Vec::new).push(child.into());
    }

    /// Children payload (empty if none was supplied).
    #[must_use]
    pub fn children(&self) -> &[Node] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Whether a children payload was supplied at all.
    #[must_use]
    pub fn has_children(&self) -> bool {
        self.children.is_some()
    }

    /// Move the children payload out of the bag.
    pub fn take_children(&mut self) -> Vec<Node> {
        self.children.take().unwrap_or_default()
    }

    #[must_use]
    pub fn with_handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    #[must_use]
    pub fn handle(&self) -> Option<&Handle> {
        self.handle.as_ref()
    }

    /// Renderer to fall back to when the tag resolves nowhere else.
    #[must_use]
    pub fn with_original_type(mut self, renderer: Renderer) -> Self {
        self.original_type = Some(renderer);
        self
    }

    #[must_use]
    pub fn original_type(&self) -> Option<&Renderer> {
        self.original_type.as_ref()
    }

    /// Tag under which the element was created.
    #[must_use]
    pub fn with_mdx_type(mut self, tag: impl Into<String>) -> Self {
        self.mdx_type = Some(tag.into());
        self
    }

    #[must_use]
    pub fn mdx_type(&self) -> Option<&str> {
        self.mdx_type.as_deref()
    }

    /// Tag of the enclosing element, enabling `parent.tag` lookups.
    #[must_use]
    pub fn with_parent_name(mut self, parent: impl Into<String>) -> Self {
        self.parent_name = Some(parent.into());
        self
    }

    #[must_use]
    pub fn parent_name(&self) -> Option<&str> {
        self.parent_name.as_deref()
    }

    /// Overrides applied on top of the active scope for this element only.
    #[must_use]
    pub fn with_components(mut self, components: RendererMap) -> Self {
        self.components = Some(components);
        self
    }

    #[must_use]
    pub fn components(&self) -> Option<&RendererMap> {
        self.components.as_ref()
    }

    /// Whether the bag carries any bookkeeping, typed or under a reserved key.
    #[must_use]
    pub fn has_bookkeeping(&self) -> bool {
        self.original_type.is_some()
            || self.mdx_type.is_some()
            || self.parent_name.is_some()
            || self.components.is_some()
            || self.attrs.keys().any(|k| is_reserved(k))
    }

    /// Merge several bags in order; later sources win.
    ///
    /// Attributes are overlaid key by key. The children payload, handle and
    /// bookkeeping fields are replaced only when a later source sets them.
    #[must_use]
    pub fn merge<'a, I>(sources: I) -> Self
    where
        I: IntoIterator<Item = &'a Self>,
    {
        sources
            .into_iter()
            .fold(Self::default(), |acc, next| acc.merged_with(next))
    }

    /// Return a new bag with `other` laid over `self`.
    #[must_use]
    pub fn merged_with(mut self, other: &Self) -> Self {
        self.attrs
            .extend(other.attrs.iter().map(|(k, v)| (k.clone(), v.clone())));
        if other.children.is_some() {
            self.children.clone_from(&other.children);
        }
        if other.handle.is_some() {
            self.handle.clone_from(&other.handle);
        }
        if other.original_type.is_some() {
            self.original_type.clone_from(&other.original_type);
        }
        if other.mdx_type.is_some() {
            self.mdx_type.clone_from(&other.mdx_type);
        }
        if other.parent_name.is_some() {
            self.parent_name.clone_from(&other.parent_name);
        }
        if other.components.is_some() {
            self.components.clone_from(&other.components);
        }
        self
    }

    /// Split into the bag a renderer may see and the resolver bookkeeping.
    ///
    /// Reserved attribute keys are removed. Textual `mdxType`, `parentName` and
    /// `originalType` attributes fill in the typed bookkeeping when the typed
    /// field was not set.
    pub(crate) fn split(mut self) -> (Self, Bookkeeping) {
        let mut book = Bookkeeping {
            original_type: self.original_type.take(),
            mdx_type: self.mdx_type.take(),
            parent_name: self.parent_name.take(),
            components: self.components.take(),
        };

        for key in RESERVED_KEYS {
            let Some(value) = self.attrs.remove(key) else {
                continue;
            };
            let PropValue::Text(text) = value else {
                continue;
            };
            match key {
                "mdxType" if book.mdx_type.is_none() => book.mdx_type = Some(text),
                "parentName" if book.parent_name.is_none() => book.parent_name = Some(text),
                "originalType" if book.original_type.is_none() => {
                    book.original_type = Some(Renderer::Builtin(text));
                }
                _ => {}
            }
        }

        (self, book)
    }

    /// Consume the bag into its attributes, children and handle.
    pub(crate) fn into_parts(self) -> (BTreeMap<String, PropValue>, Vec<Node>, Option<Handle>) {
        (self.attrs, self.children.unwrap_or_default(), self.handle)
    }
}
