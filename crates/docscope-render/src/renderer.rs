//! Renderer variants and tag → renderer maps.

use std::collections::HashMap;
use std::collections::hash_map;
use std::fmt;
use std::sync::Arc;

use crate::error::ComponentError;
use crate::node::{Element, Node};
use crate::props::PropertyBag;

/// A custom renderer.
///
/// Components receive a sanitized [`PropertyBag`]: user attributes, the
/// children payload and a forwarded handle, never resolver bookkeeping.
///
/// # Thread Safety
///
/// Components are `Send + Sync` so that a [`Scope`](crate::Scope) holding them
/// can be shared between threads rendering independent documents.
///
/// # Example
///
/// ```
/// use docscope_render::{Component, ComponentError, Element, Node, PropertyBag};
///
/// struct Callout;
///
/// impl Component for Callout {
///     fn name(&self) -> &str { "Callout" }
///
///     fn render(&self, mut props: PropertyBag) -> Result<Node, ComponentError> {
///         Ok(Element::new("aside")
///             .with_attr("class", "callout")
///             .with_children(props.take_children())
///             .into())
///     }
/// }
/// ```
pub trait Component: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Produce output for one element.
    fn render(&self, props: PropertyBag) -> Result<Node, ComponentError>;
}

type RenderFn = dyn Fn(PropertyBag) -> Result<Node, ComponentError> + Send + Sync;

/// Component backed by a closure.
struct FnComponent {
    name: String,
    render: Box<RenderFn>,
}

impl Component for FnComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, props: PropertyBag) -> Result<Node, ComponentError> {
        (self.render)(props)
    }
}

/// What to invoke for a tag.
#[derive(Clone)]
pub enum Renderer {
    /// Output primitive understood natively by the output target (e.g. `h1`).
    Builtin(String),
    /// Custom component.
    Component(Arc<dyn Component>),
}

impl Renderer {
    /// Built-in output primitive.
    #[must_use]
    pub fn builtin(name: impl Into<String>) -> Self {
        Self::Builtin(name.into())
    }

    /// Wrap a component.
    #[must_use]
    pub fn component<C: Component + 'static>(component: C) -> Self {
        Self::Component(Arc::new(component))
    }

    /// Wrap a closure as a named component.
    ///
    /// ```
    /// use docscope_render::{Element, Renderer};
    ///
    /// let shout = Renderer::from_fn("Shout", |mut props| {
    ///     Ok(Element::new("strong").with_children(props.take_children()).into())
    /// });
    /// assert_eq!(shout.name(), "Shout");
    /// ```
    #[must_use]
    pub fn from_fn<F>(name: impl Into<String>, render: F) -> Self
    where
        F: Fn(PropertyBag) -> Result<Node, ComponentError> + Send + Sync + 'static,
    {
        Self::component(FnComponent {
            name: name.into(),
            render: Box::new(render),
        })
    }

    /// Primitive name or component name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Builtin(name) => name,
            Self::Component(c) => c.name(),
        }
    }

    #[must_use]
    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin(_))
    }

    /// Identity comparison: same primitive name, or the same component instance.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Builtin(a), Self::Builtin(b)) => a == b,
            (Self::Component(a), Self::Component(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }

    /// Invoke with an already sanitized bag.
    ///
    /// Built-in primitives never fail. Component errors are returned as is.
    pub(crate) fn invoke(&self, props: PropertyBag) -> Result<Node, ComponentError> {
        match self {
            Self::Builtin(name) => {
                let (attrs, children, handle) = props.into_parts();
                Ok(Node::Element(Element {
                    name: name.clone(),
                    attrs,
                    children,
                    handle,
                }))
            }
            Self::Component(c) => c.render(props),
        }
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(name) => f.debug_tuple("Builtin").field(name).finish(),
            Self::Component(c) => f.debug_tuple("Component").field(&c.name()).finish(),
        }
    }
}

impl PartialEq for Renderer {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

/// Mapping from tag name to renderer.
///
/// Keys are unique. Combining maps uses overlay semantics: see
/// [`overlay`](Self::overlay).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RendererMap {
    entries: HashMap<String, Renderer>,
}

impl RendererMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map of built-in aliases, e.g. `("inlineCode", "code")`.
    #[must_use]
    pub fn from_aliases<I, K, V>(aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        aliases
            .into_iter()
            .map(|(tag, primitive)| (tag.into(), Renderer::Builtin(primitive.into())))
            .collect()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, tag: impl Into<String>, renderer: Renderer) -> Self {
        self.entries.insert(tag.into(), renderer);
        self
    }

    /// Insert a renderer, returning the one it replaced.
    pub fn insert(&mut self, tag: impl Into<String>, renderer: Renderer) -> Option<Renderer> {
        self.entries.insert(tag.into(), renderer)
    }

    pub fn remove(&mut self, tag: &str) -> Option<Renderer> {
        self.entries.remove(tag)
    }

    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&Renderer> {
        self.entries.get(tag)
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Renderer)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// New map with `overrides` laid over `self`.
    ///
    /// Keys present in `overrides` shadow this map's entry; all other keys
    /// keep their current renderer. Neither input is modified.
    #[must_use]
    pub fn overlay(&self, overrides: &Self) -> Self {
        let mut merged = self.clone();
        merged.entries.extend(
            overrides
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        merged
    }
}

impl<K: Into<String>> FromIterator<(K, Renderer)> for RendererMap {
    fn from_iter<T: IntoIterator<Item = (K, Renderer)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<K: Into<String>> Extend<(K, Renderer)> for RendererMap {
    fn extend<T: IntoIterator<Item = (K, Renderer)>>(&mut self, iter: T) {
        self.entries
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v)));
    }
}

impl IntoIterator for RendererMap {
    type Item = (String, Renderer);
    type IntoIter = hash_map::IntoIter<String, Renderer>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
