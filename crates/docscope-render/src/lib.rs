//! Scoped component-override resolution for documentation content.
//!
//! Documents are parsed elsewhere into a tree of typed nodes. This crate
//! decides, for every node, which renderer to invoke, and lets callers
//! override default renderers selectively through nested scopes.
//!
//! # Architecture
//!
//! - [`Scope`]: immutable view of tag → renderer overrides. Entering a nested
//!   scope overlays new overrides on the parent without touching it.
//! - [`ElementResolver`]: renders one node. Looks the tag up in the scope,
//!   falls back to the default table, and finally to the tag itself as a
//!   literal primitive. Bookkeeping props are stripped before the renderer
//!   sees the bag.
//! - [`MarkdownRenderer`]: drives the resolver from a pulldown-cmark event
//!   stream.
//!
//! Scopes are passed explicitly to every call; nothing is read from global
//! state, and no scope is mutated after it is built.
//!
//! # Example
//!
//! ```
//! use docscope_render::{Element, Node, PropertyBag, Renderer, RendererMap, Scope, render};
//!
//! let document = Scope::root().enter(RendererMap::new().with(
//!     "blockquote",
//!     Renderer::from_fn("Callout", |mut props| {
//!         Ok(Element::new("aside").with_children(props.take_children()).into())
//!     }),
//! ));
//!
//! let quote = render("blockquote", PropertyBag::new().with_child("Hi"), &document).unwrap();
//! assert_eq!(quote.name(), Some("aside"));
//!
//! let unknown = render("widget-foo", PropertyBag::new(), &document).unwrap();
//! assert_eq!(unknown.name(), Some("widget-foo"));
//! ```

mod defaults;
mod error;
mod markdown;
mod node;
mod props;
mod renderer;
mod resolver;
mod scope;
mod util;

pub use defaults::{
    Fragment, STANDARD_ALIASES, STANDARD_PRIMITIVES, WRAPPER_TAG, standard_defaults,
};
pub use error::ComponentError;
pub use markdown::MarkdownRenderer;
pub use node::{Element, Handle, Node, PropValue};
pub use props::{PropertyBag, RESERVED_KEYS, is_reserved};
pub use renderer::{Component, Renderer, RendererMap};
pub use resolver::{ElementResolver, Resolution, ResolutionSource, Selector, render};
pub use scope::{Scope, enter_scope, resolve};
