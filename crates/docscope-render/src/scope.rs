//! Scope registry: nested, immutable views of tag → renderer overrides.
//!
//! A [`Scope`] holds the effective map for one rendering context. Entering a
//! nested context builds a new scope by overlaying the context's overrides on
//! the parent's effective map; the parent is never modified, so sibling
//! sub-trees cannot observe each other's overrides.
//!
//! Scopes are passed explicitly to every render call rather than read from
//! ambient state.
//!
//! # Example
//!
//! ```
//! use docscope_render::{Renderer, RendererMap, Scope};
//!
//! let page = Scope::root().enter(RendererMap::from_aliases([("h1", "h2"), ("p", "div")]));
//! let sidebar = page.enter(RendererMap::from_aliases([("h1", "h3")]));
//!
//! assert_eq!(sidebar.resolve("h1"), Some(&Renderer::builtin("h3")));
//! assert_eq!(sidebar.resolve("p"), Some(&Renderer::builtin("div")));
//! assert_eq!(page.resolve("h1"), Some(&Renderer::builtin("h2")));
//! ```

use std::sync::Arc;

use crate::renderer::{Renderer, RendererMap};

/// Immutable, cheaply clonable view of the active overrides.
///
/// A scope with no overrides resolves nothing, which makes every tag fall
/// back to the default table.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    map: Arc<RendererMap>,
}

impl Scope {
    /// Scope with no overrides.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Scope whose effective map is exactly `map`.
    #[must_use]
    pub fn from_map(map: RendererMap) -> Self {
        Self { map: Arc::new(map) }
    }

    /// Nested scope with `overrides` laid over this scope's effective map.
    ///
    /// An empty `overrides` map yields a scope sharing this scope's map.
    #[must_use]
    pub fn enter(&self, overrides: RendererMap) -> Self {
        if overrides.is_empty() {
            return self.clone();
        }
        tracing::trace!(overrides = overrides.len(), "Entering nested scope");
        let mut map = RendererMap::clone(&self.map);
        map.extend(overrides);
        Self::from_map(map)
    }

    /// Nested scope whose effective map is computed from this scope's map.
    ///
    /// Unlike [`enter`](Self::enter), `derive` replaces the effective map
    /// wholesale with whatever `f` returns, so it can remove, rename or wrap
    /// inherited renderers.
    ///
    /// ```
    /// use docscope_render::{Renderer, RendererMap, Scope};
    ///
    /// let outer = Scope::root().enter(RendererMap::from_aliases([("h1", "h2"), ("p", "div")]));
    /// let inner = outer.derive(|parent| {
    ///     let mut map = parent.clone();
    ///     map.remove("p");
    ///     map
    /// });
    ///
    /// assert!(inner.resolve("p").is_none());
    /// assert_eq!(outer.resolve("p"), Some(&Renderer::builtin("div")));
    /// ```
    #[must_use]
    pub fn derive<F>(&self, f: F) -> Self
    where
        F: FnOnce(&RendererMap) -> RendererMap,
    {
        let map = f(&self.map);
        tracing::debug!(
            inherited = self.map.len(),
            derived = map.len(),
            "Derived scope from parent map"
        );
        Self::from_map(map)
    }

    /// Effective renderer for `tag`, or `None` if no level registers it.
    #[must_use]
    pub fn resolve(&self, tag: &str) -> Option<&Renderer> {
        self.map.get(tag)
    }

    /// The fully merged map.
    #[must_use]
    pub fn effective(&self) -> &RendererMap {
        &self.map
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Whether both scopes share the same effective map allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.map, &other.map)
    }
}

/// Enter a scope: overlay `overrides` on `parent`, or start from `overrides`
/// alone when there is no parent.
#[must_use]
pub fn enter_scope(overrides: RendererMap, parent: Option<&Scope>) -> Scope {
    match parent {
        Some(parent) => parent.enter(overrides),
        None => Scope::from_map(overrides),
    }
}

/// Effective renderer for `tag` in `scope`.
#[must_use]
pub fn resolve(scope: &Scope, tag: &str) -> Option<Renderer> {
    scope.resolve(tag).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Element;
    use pretty_assertions::assert_eq;

    fn aliases(pairs: &[(&str, &str)]) -> RendererMap {
        RendererMap::from_aliases(pairs.iter().copied())
    }

    #[test]
    fn test_root_is_empty() {
        let scope = Scope::root();
        assert!(scope.is_empty());
        assert!(scope.resolve("p").is_none());
    }

    #[test]
    fn test_enter_without_parent_equals_overrides() {
        let scope = enter_scope(aliases(&[("code", "samp")]), None);
        assert_eq!(scope.effective(), &aliases(&[("code", "samp")]));
    }

    #[test]
    fn test_enter_overlays_parent() {
        let outer = enter_scope(aliases(&[("h1", "h2"), ("p", "div")]), None);
        let inner = enter_scope(aliases(&[("h1", "h3")]), Some(&outer));

        assert_eq!(resolve(&inner, "h1"), Some(Renderer::builtin("h3")));
        assert_eq!(resolve(&inner, "p"), Some(Renderer::builtin("div")));
    }

    #[test]
    fn test_enter_does_not_mutate_parent() {
        let outer = enter_scope(aliases(&[("h1", "h2")]), None);
        let before = outer.effective().clone();

        {
            let inner = outer.enter(aliases(&[("h1", "h3"), ("em", "i")]));
            assert_eq!(inner.len(), 2);
        }

        assert_eq!(outer.effective(), &before);
        assert!(outer.resolve("em").is_none());
    }

    #[test]
    fn test_siblings_do_not_leak() {
        let page = Scope::root().enter(aliases(&[("p", "p")]));
        let left = page.enter(aliases(&[("code", "samp")]));
        let right = page.enter(aliases(&[("em", "i")]));

        assert!(left.resolve("em").is_none());
        assert!(right.resolve("code").is_none());
    }

    #[test]
    fn test_most_recent_scope_wins() {
        let chain = ["h2", "h3", "h4", "h5"]
            .iter()
            .fold(Scope::root(), |scope, level| scope.enter(aliases(&[("h1", *level)])));
        assert_eq!(chain.resolve("h1"), Some(&Renderer::builtin("h5")));
    }

    #[test]
    fn test_empty_overrides_share_parent_map() {
        let outer = Scope::root().enter(aliases(&[("p", "div")]));
        let inner = outer.enter(RendererMap::new());
        assert!(inner.ptr_eq(&outer));
    }

    #[test]
    fn test_derive_replaces_effective_map() {
        let outer = Scope::root().enter(aliases(&[("h1", "h2"), ("p", "div")]));
        let wrapped = outer.derive(|parent| {
            parent
                .iter()
                .map(|(tag, r)| {
                    let inner = r.clone();
                    let renderer = Renderer::from_fn(format!("Wrapped({tag})"), move |props| {
                        let node = inner.invoke(props)?;
                        Ok(Element::new("section").with_child(node).into())
                    });
                    (tag.to_owned(), renderer)
                })
                .collect()
        });

        assert_eq!(wrapped.len(), 2);
        assert_eq!(wrapped.resolve("h1").map(Renderer::name), Some("Wrapped(h1)"));
        assert_eq!(outer.resolve("h1"), Some(&Renderer::builtin("h2")));
    }

    static_assertions::assert_impl_all!(super::Scope: Send, Sync);
}
