//! Default renderer table.
//!
//! Every tag the markdown adapter can emit has an entry here. Most tags map to
//! the output primitive of the same name; a few parser-level names are aliased
//! to the primitive that represents them, and `wrapper` renders its children
//! without an enclosing element.

use crate::error::ComponentError;
use crate::node::Node;
use crate::props::PropertyBag;
use crate::renderer::{Component, Renderer, RendererMap};

/// Tag used for the outermost element of a rendered document.
pub const WRAPPER_TAG: &str = "wrapper";

/// Tags whose default is the primitive of the same name.
pub const STANDARD_PRIMITIVES: &[&str] = &[
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "blockquote",
    "ul",
    "ol",
    "li",
    "pre",
    "code",
    "em",
    "strong",
    "del",
    "a",
    "img",
    "hr",
    "br",
    "table",
    "thead",
    "tbody",
    "tr",
    "th",
    "td",
    "sup",
    "sub",
    "dl",
    "dt",
    "dd",
    "input",
    "section",
];

/// Parser-level tag names and the primitive each one renders as.
pub const STANDARD_ALIASES: &[(&str, &str)] = &[
    ("inlineCode", "code"),
    ("thematicBreak", "hr"),
    ("delete", "del"),
];

/// Renders its children payload as a [`Node::Fragment`].
pub struct Fragment;

impl Component for Fragment {
    fn name(&self) -> &str {
        "Fragment"
    }

    fn render(&self, mut props: PropertyBag) -> Result<Node, ComponentError> {
        Ok(Node::Fragment(props.take_children()))
    }
}

/// Build the standard default table.
#[must_use]
pub fn standard_defaults() -> RendererMap {
    let mut map: RendererMap = STANDARD_PRIMITIVES
        .iter()
        .map(|&tag| (tag, Renderer::builtin(tag)))
        .collect();
    map.extend(
        STANDARD_ALIASES
            .iter()
            .map(|&(tag, primitive)| (tag, Renderer::builtin(primitive))),
    );
    map.insert(WRAPPER_TAG, Renderer::component(Fragment));
    map
}
