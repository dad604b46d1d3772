//! Element resolver: the single entry point for rendering one content node.
//!
//! # Resolution order
//!
//! For a tag selector, the first match wins:
//!
//! 1. `"{parentName}.{tag}"` in the active scope (e.g. `pre.code`)
//! 2. `tag` in the active scope
//! 3. `tag` in the default table
//! 4. the `originalType` renderer carried by the property bag
//! 5. `tag` itself as a literal output primitive
//!
//! A per-element `components` overlay is consulted before the scope at steps 1
//! and 2. A selector that is already a [`Renderer`] skips all of this and is
//! invoked as is.
//!
//! Step 5 means rendering never fails because a tag is unknown: content the
//! renderer has never heard of degrades to a plain element of the same name.
//!
//! Before invoking the selected renderer, the resolver strips bookkeeping from
//! the property bag (see [`RESERVED_KEYS`](crate::RESERVED_KEYS)). Attributes,
//! children and the forwarded handle reach the renderer unchanged, and the
//! renderer's result (or error) is returned unchanged.

use std::sync::{Arc, LazyLock};

use crate::defaults::standard_defaults;
use crate::error::ComponentError;
use crate::node::Node;
use crate::props::{Bookkeeping, PropertyBag};
use crate::renderer::{Renderer, RendererMap};
use crate::scope::Scope;

/// What to render: a tag name to look up, or a renderer to use directly.
#[derive(Clone, Debug, PartialEq)]
pub enum Selector {
    Tag(String),
    Renderer(Renderer),
}

impl Selector {
    #[must_use]
    pub fn tag(name: impl Into<String>) -> Self {
        Self::Tag(name.into())
    }
}

impl From<&str> for Selector {
    fn from(tag: &str) -> Self {
        Self::Tag(tag.to_owned())
    }
}

impl From<String> for Selector {
    fn from(tag: String) -> Self {
        Self::Tag(tag)
    }
}

impl From<Renderer> for Selector {
    fn from(renderer: Renderer) -> Self {
        Self::Renderer(renderer)
    }
}

/// Where a resolved renderer came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolutionSource {
    /// The selector was a renderer.
    Direct,
    /// Found in the scope (or the element's `components` overlay) under this key.
    Scoped(String),
    /// Found in the default table.
    Default,
    /// The bag's `originalType` renderer.
    Original,
    /// No entry anywhere; the tag is used as a literal primitive.
    Passthrough,
}

/// Outcome of resolving a selector.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub renderer: Renderer,
    pub source: ResolutionSource,
}

/// Selects renderers for content nodes and invokes them.
///
/// The resolver owns an immutable default table and carries no per-call
/// state, so one instance can serve any number of documents and threads.
///
/// # Example
///
/// ```
/// use docscope_render::{ElementResolver, Node, PropertyBag, Renderer, RendererMap, Scope};
///
/// let resolver = ElementResolver::standard();
/// let scope = Scope::root().enter(RendererMap::new().with(
///     "code",
///     Renderer::from_fn("Highlighted", |mut props| {
///         let source = props.take_children();
///         Ok(Node::Fragment(source))
///     }),
/// ));
///
/// let node = resolver
///     .render("code", PropertyBag::new().with_child("x=1"), &scope)
///     .unwrap();
/// assert_eq!(node, Node::Fragment(vec![Node::text("x=1")]));
/// ```
#[derive(Clone, Debug)]
pub struct ElementResolver {
    defaults: Arc<RendererMap>,
}

impl Default for ElementResolver {
    fn default() -> Self {
        Self::standard()
    }
}

impl ElementResolver {
    /// Resolver using the standard default table.
    #[must_use]
    pub fn standard() -> Self {
        Self::with_defaults(standard_defaults())
    }

    /// Resolver using a custom default table.
    #[must_use]
    pub fn with_defaults(defaults: RendererMap) -> Self {
        Self {
            defaults: Arc::new(defaults),
        }
    }

    /// The default table consulted after the scope.
    #[must_use]
    pub fn defaults(&self) -> &RendererMap {
        &self.defaults
    }

    /// Decide which renderer `selector` would use, without invoking it.
    #[must_use]
    pub fn resolve(&self, selector: &Selector, props: &PropertyBag, scope: &Scope) -> Resolution {
        let (_, book) = props.clone().split();
        self.resolve_with(selector, &book, scope)
    }

    /// Render one node.
    ///
    /// # Errors
    ///
    /// Returns the selected component's error unchanged. Built-in primitives
    /// and unknown tags never fail.
    pub fn render(
        &self,
        selector: impl Into<Selector>,
        props: PropertyBag,
        scope: &Scope,
    ) -> Result<Node, ComponentError> {
        let selector = selector.into();
        let (props, book) = props.split();
        let Resolution { renderer, source } = self.resolve_with(&selector, &book, scope);
        tracing::trace!(renderer = renderer.name(), source = ?source, "Resolved element");
        renderer.invoke(props)
    }

    fn resolve_with(&self, selector: &Selector, book: &Bookkeeping, scope: &Scope) -> Resolution {
        match selector {
            Selector::Renderer(renderer) => match book.mdx_type.as_deref() {
                // A typed element routes through the tag, keeping the
                // renderer as its original type.
                Some(tag) => self.resolve_tag(tag, book, Some(renderer), scope),
                None => Resolution {
                    renderer: renderer.clone(),
                    source: ResolutionSource::Direct,
                },
            },
            Selector::Tag(tag) => self.resolve_tag(tag, book, book.original_type.as_ref(), scope),
        }
    }

    fn resolve_tag(
        &self,
        tag: &str,
        book: &Bookkeeping,
        original: Option<&Renderer>,
        scope: &Scope,
    ) -> Resolution {
        let components = book.components.as_ref();

        if let Some(parent) = book.parent_name.as_deref() {
            let qualified = format!("{parent}.{tag}");
            if let Some(renderer) = lookup(scope, components, &qualified) {
                return Resolution {
                    renderer: renderer.clone(),
                    source: ResolutionSource::Scoped(qualified),
                };
            }
        }

        if let Some(renderer) = lookup(scope, components, tag) {
            return Resolution {
                renderer: renderer.clone(),
                source: ResolutionSource::Scoped(tag.to_owned()),
            };
        }

        if let Some(renderer) = self.defaults.get(tag) {
            return Resolution {
                renderer: renderer.clone(),
                source: ResolutionSource::Default,
            };
        }

        if let Some(renderer) = original {
            return Resolution {
                renderer: renderer.clone(),
                source: ResolutionSource::Original,
            };
        }

        tracing::debug!(tag, "No renderer registered, passing tag through as primitive");
        Resolution {
            renderer: Renderer::builtin(tag),
            source: ResolutionSource::Passthrough,
        }
    }
}

/// Look `key` up in the element's overlay first, then in the scope.
fn lookup<'a>(
    scope: &'a Scope,
    components: Option<&'a RendererMap>,
    key: &str,
) -> Option<&'a Renderer> {
    components
        .and_then(|overlay| overlay.get(key))
        .or_else(|| scope.resolve(key))
}

static STANDARD_RESOLVER: LazyLock<ElementResolver> = LazyLock::new(ElementResolver::standard);

/// Render one node with the standard default table.
///
/// # Errors
///
/// Returns the selected component's error unchanged.
pub fn render(
    selector: impl Into<Selector>,
    props: PropertyBag,
    scope: &Scope,
) -> Result<Node, ComponentError> {
    STANDARD_RESOLVER.render(selector, props, scope)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::node::{Element, Handle, PropValue};
    use pretty_assertions::assert_eq;

    /// Component that records the bag it was called with.
    fn recorder(name: &str) -> (Renderer, Arc<Mutex<Vec<PropertyBag>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let label = name.to_owned();
        let renderer = Renderer::from_fn(name, move |props: PropertyBag| {
            sink.lock().unwrap().push(props);
            Ok(Node::text(label.clone()))
        });
        (renderer, calls)
    }

    #[test]
    fn test_default_used_without_override() {
        let (code_block, calls) = recorder("CodeBlockRenderer");
        let resolver = ElementResolver::with_defaults(RendererMap::new().with("code", code_block));
        let props = PropertyBag::with_children_only([Node::text("x=1")]);

        let node = resolver.render("code", props.clone(), &Scope::root()).unwrap();

        assert_eq!(node, Node::text("CodeBlockRenderer"));
        assert_eq!(calls.lock().unwrap().as_slice(), &[props]);
    }

    #[test]
    fn test_override_beats_default() {
        let (default_code, default_calls) = recorder("CodeBlockRenderer");
        let (custom_code, custom_calls) = recorder("CustomCodeRenderer");
        let resolver =
            ElementResolver::with_defaults(RendererMap::new().with("code", default_code));
        let inner = Scope::root().enter(RendererMap::new().with("code", custom_code));

        let node = resolver
            .render("code", PropertyBag::with_children_only([Node::text("x=1")]), &inner)
            .unwrap();

        assert_eq!(node, Node::text("CustomCodeRenderer"));
        assert_eq!(custom_calls.lock().unwrap().len(), 1);
        assert!(default_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_tag_passes_through() {
        let node = render(
            "widget-foo",
            PropertyBag::with_children_only(Vec::new()),
            &Scope::root(),
        )
        .unwrap();
        assert_eq!(node, Node::Element(Element::new("widget-foo")));
    }

    #[test]
    fn test_resolution_sources() {
        let resolver = ElementResolver::standard();
        let scope = Scope::root().enter(RendererMap::from_aliases([("em", "i")]));
        let bag = PropertyBag::new();

        let source = |tag: &str| resolver.resolve(&Selector::tag(tag), &bag, &scope).source;

        assert_eq!(source("em"), ResolutionSource::Scoped("em".to_owned()));
        assert_eq!(source("strong"), ResolutionSource::Default);
        assert_eq!(source("widget-foo"), ResolutionSource::Passthrough);
        assert_eq!(
            resolver
                .resolve(&Renderer::builtin("x").into(), &bag, &scope)
                .source,
            ResolutionSource::Direct
        );
    }

    #[test]
    fn test_direct_renderer_skips_lookup() {
        let (direct, calls) = recorder("Direct");
        let scope = Scope::root().enter(RendererMap::from_aliases([("Direct", "div")]));

        let node = render(direct, PropertyBag::new().with_attr("id", "x"), &scope).unwrap();

        assert_eq!(node, Node::text("Direct"));
        assert_eq!(calls.lock().unwrap()[0].attr_str("id"), Some("x"));
    }

    #[test]
    fn test_direct_renderer_with_mdx_type_routes_through_tag() {
        let (tabs, _) = recorder("Tabs");
        let resolver = ElementResolver::standard();
        let overridden = Scope::root().enter(RendererMap::from_aliases([("Tabs", "div")]));
        let bag = PropertyBag::new().with_mdx_type("Tabs");

        let hit = resolver.resolve(&tabs.clone().into(), &bag, &overridden);
        assert_eq!(hit.renderer, Renderer::builtin("div"));

        let miss = resolver.resolve(&tabs.clone().into(), &bag, &Scope::root());
        assert_eq!(miss.source, ResolutionSource::Original);
        assert_eq!(miss.renderer, tabs);
    }

    #[test]
    fn test_parent_qualified_key_wins() {
        let scope = Scope::root().enter(RendererMap::from_aliases([
            ("pre.code", "samp"),
            ("code", "kbd"),
        ]));

        let in_pre = render("code", PropertyBag::new().with_parent_name("pre"), &scope).unwrap();
        let inline = render("code", PropertyBag::new().with_parent_name("p"), &scope).unwrap();

        assert_eq!(in_pre.name(), Some("samp"));
        assert_eq!(inline.name(), Some("kbd"));
    }

    #[test]
    fn test_components_overlay_applies_to_one_element() {
        let scope = Scope::root().enter(RendererMap::from_aliases([("em", "i"), ("p", "div")]));
        let local = RendererMap::from_aliases([("em", "span")]);

        let with_overlay = render("em", PropertyBag::new().with_components(local), &scope).unwrap();
        let without = render("em", PropertyBag::new(), &scope).unwrap();
        let fallthrough = render(
            "p",
            PropertyBag::new().with_components(RendererMap::from_aliases([("em", "span")])),
            &scope,
        )
        .unwrap();

        assert_eq!(with_overlay.name(), Some("span"));
        assert_eq!(without.name(), Some("i"));
        assert_eq!(fallthrough.name(), Some("div"));
    }

    #[test]
    fn test_original_type_before_passthrough() {
        let (original, _) = recorder("Widget");
        let bag = PropertyBag::new().with_original_type(original);
        let node = render("widget-foo", bag, &Scope::root()).unwrap();
        assert_eq!(node, Node::text("Widget"));
    }

    #[test]
    fn test_default_beats_original_type() {
        let (original, calls) = recorder("Widget");
        let bag = PropertyBag::new().with_original_type(original);
        let node = render("p", bag, &Scope::root()).unwrap();
        assert_eq!(node.name(), Some("p"));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_bookkeeping_never_reaches_renderer() {
        let (custom, calls) = recorder("Custom");
        let scope = Scope::root().enter(RendererMap::new().with("li", custom));
        let bag = PropertyBag::new()
            .with_attr("mdxType", "li")
            .with_attr("originalType", "li")
            .with_attr("parentName", "ul")
            .with_attr("className", "task-list-item")
            .with_mdx_type("li")
            .with_parent_name("ul")
            .with_components(RendererMap::new())
            .with_child("item");

        render("li", bag, &scope).unwrap();

        let seen = &calls.lock().unwrap()[0];
        assert!(!seen.has_bookkeeping());
        assert_eq!(seen.attrs().len(), 1);
        assert_eq!(
            seen.attr("className"),
            Some(&PropValue::from("task-list-item"))
        );
        assert_eq!(seen.children(), &[Node::text("item")]);
    }

    #[test]
    fn test_handle_is_forwarded() {
        let handle = Handle::new("focus-target");
        let (custom, calls) = recorder("Custom");
        let scope = Scope::root().enter(RendererMap::new().with("h2", custom));

        render("h2", PropertyBag::new().with_handle(handle.clone()), &scope).unwrap();
        let builtin = render("h3", PropertyBag::new().with_handle(handle.clone()), &scope).unwrap();

        assert_eq!(calls.lock().unwrap()[0].handle(), Some(&handle));
        assert_eq!(builtin.as_element().and_then(|el| el.handle.as_ref()), Some(&handle));
    }

    #[test]
    fn test_component_error_propagates_unchanged() {
        let failing = Renderer::from_fn("Chart", |_| {
            Err(ComponentError::invalid_prop("Chart", "data", "not csv"))
        });
        let scope = Scope::root().enter(RendererMap::new().with("chart", failing));

        let err = render("chart", PropertyBag::new(), &scope).unwrap_err();

        assert_eq!(
            err.to_string(),
            "component `Chart`: invalid value for prop `data`: not csv"
        );
    }

    static_assertions::assert_impl_all!(super::ElementResolver: Send, Sync);
    static_assertions::assert_impl_all!(super::Renderer: Send, Sync);
}
